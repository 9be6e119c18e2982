//! Per-sequence resend exchange.
//!
//! Each missing sequence gets its own [`RecoverySession`] over a dedicated
//! connection:
//!
//! ```text
//! Open --connect--> Requested --send [0x02, seq]--> Receiving --17 bytes--> Complete
//!   \                   \                              \
//!    +------------------+------------------------------+--> Abandoned
//! ```
//!
//! Failures never escape the session: the caller gets a [`RecoveryOutcome`]
//! and moves on to the next sequence. The connection is owned by the
//! exchange and dropped (closed) on every exit path.
use std::io::{self, ErrorKind, Read, Write};

use tracing::{debug, info, trace, warn};

use crate::reassembler::is_timeout;
use crate::record::{Record, RECORD_SIZE};
use crate::store::RecordStore;
use crate::transport::Connector;
use crate::wire::{ResendRequest, MAX_ADDRESSABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Requested,
    Receiving,
    Complete,
    Abandoned,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Abandoned)
    }
}

/// Why a session was abandoned. Partial bytes are never kept.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),
    #[error("sending resend request failed: {0}")]
    Send(#[source] io::Error),
    #[error("idle timeout after {received} of {expected} bytes", expected = RECORD_SIZE)]
    TimedOut { received: usize },
    #[error("connection closed after {received} of {expected} bytes", expected = RECORD_SIZE)]
    Closed { received: usize },
    #[error("receive failed after {received} bytes: {source}")]
    Receive {
        received: usize,
        #[source]
        source: io::Error,
    },
}

/// One-shot exchange fetching a single record.
pub struct RecoverySession<C> {
    connector: C,
    request: ResendRequest,
    state: SessionState,
}

impl<C: Connector> RecoverySession<C> {
    pub fn new(connector: C, sequence: i32) -> Self {
        RecoverySession { connector, request: ResendRequest::new(sequence), state: SessionState::Open }
    }

    pub fn sequence(&self) -> i32 {
        self.request.sequence()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session to `Complete` or `Abandoned`. Must be called once.
    pub fn run(&mut self) -> Result<Record, RecoveryError> {
        debug_assert_eq!(self.state, SessionState::Open, "recovery session reused");
        let result = self.exchange();
        self.state = match result {
            Ok(_) => SessionState::Complete,
            Err(_) => SessionState::Abandoned,
        };
        trace!(seq = self.sequence(), state = ?self.state, "session finished");
        result
    }

    fn exchange(&mut self) -> Result<Record, RecoveryError> {
        let mut conn = self.connector.connect().map_err(RecoveryError::Connect)?;

        conn.write_all(&self.request.encode())
            .and_then(|()| conn.flush())
            .map_err(RecoveryError::Send)?;
        self.state = SessionState::Requested;
        trace!(seq = self.sequence(), "resend request sent");

        self.state = SessionState::Receiving;
        let frame = read_frame(&mut conn)?;
        Ok(Record::decode(&frame))
    }
}

/// Collect exactly one frame, retrying short reads on the same connection.
fn read_frame<R: Read>(conn: &mut R) -> Result<[u8; RECORD_SIZE], RecoveryError> {
    let mut frame = [0u8; RECORD_SIZE];
    let mut received = 0;
    while received < RECORD_SIZE {
        match conn.read(&mut frame[received..]) {
            Ok(0) => return Err(RecoveryError::Closed { received }),
            Ok(n) => received += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(&e) => return Err(RecoveryError::TimedOut { received }),
            Err(source) => return Err(RecoveryError::Receive { received, source }),
        }
    }
    Ok(frame)
}

#[derive(Debug)]
pub enum RecoveryOutcome {
    Recovered(Record),
    /// Server answered with a different sequence; the record was filed under
    /// its decoded sequence.
    Mismatched { requested: i32, record: Record },
    Abandoned(RecoveryError),
}

/// Tally of a recovery pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    pub attempted: usize,
    pub recovered: usize,
    /// `(requested, received)` pairs.
    pub mismatched: Vec<(i32, i32)>,
    pub abandoned: Vec<i32>,
    /// Requests whose sequence did not fit the one-byte field.
    pub unaddressable: usize,
}

/// Run one session for `sequence` and apply its result to `store`.
pub fn recover_one<C: Connector>(connector: C, store: &mut RecordStore, sequence: i32) -> RecoveryOutcome {
    let mut session = RecoverySession::new(connector, sequence);
    match session.run() {
        Ok(record) if record.sequence == sequence => {
            debug!(seq = sequence, %record, "recovered");
            store.insert(record);
            RecoveryOutcome::Recovered(record)
        }
        Ok(record) => {
            warn!(
                requested = sequence,
                received = record.sequence,
                "resend returned a different sequence; storing under the received one"
            );
            store.insert(record);
            RecoveryOutcome::Mismatched { requested: sequence, record }
        }
        Err(e) => {
            warn!(seq = sequence, error = %e, "abandoning sequence");
            RecoveryOutcome::Abandoned(e)
        }
    }
}

/// Recover every sequence in `missing`, in the given order, one connection
/// at a time. Abandoned sequences are not retried.
pub fn recover_missing<C: Connector>(connector: &C, store: &mut RecordStore, missing: &[i32]) -> RecoveryReport {
    let mut report = RecoveryReport::default();
    for &sequence in missing {
        let request = ResendRequest::new(sequence);
        if !request.is_addressable() {
            warn!(
                seq = sequence,
                sent = request.sequence_byte(),
                max = MAX_ADDRESSABLE,
                "sequence does not fit the resend request; the truncated value is sent"
            );
            report.unaddressable += 1;
        }
        report.attempted += 1;
        match recover_one(connector, store, sequence) {
            RecoveryOutcome::Recovered(_) => report.recovered += 1,
            RecoveryOutcome::Mismatched { requested, record } => report.mismatched.push((requested, record.sequence)),
            RecoveryOutcome::Abandoned(_) => report.abandoned.push(sequence),
        }
    }
    info!(
        attempted = report.attempted,
        recovered = report.recovered,
        mismatched = report.mismatched.len(),
        abandoned = report.abandoned.len(),
        "recovery pass finished"
    );
    report
}
