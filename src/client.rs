//! Whole-run orchestration: stream, analyze, recover.
use std::io::{self, Write};

use tracing::{debug, info, warn};

use crate::gaps::{self, GapAnalysis};
use crate::reassembler::{FrameReader, StreamEnd};
use crate::recovery::{self, RecoveryReport};
use crate::store::RecordStore;
use crate::transport::Connector;
use crate::wire::STREAM_ALL_REQUEST;

/// Failures that make the run meaningless. Everything else is absorbed.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("could not connect for the initial stream: {0}")]
    Connect(#[source] io::Error),
    #[error("could not send the stream-all request: {0}")]
    Request(#[source] io::Error),
}

#[derive(Debug)]
pub struct StreamSummary {
    /// Frames decoded, duplicates included.
    pub records: usize,
    /// Frames that replaced an already stored sequence.
    pub duplicates: usize,
    pub end: StreamEnd,
    /// Trailing bytes that never formed a full frame.
    pub discarded: usize,
}

#[derive(Debug)]
pub struct RunReport {
    pub stream: StreamSummary,
    pub gaps: GapAnalysis,
    pub recovery: RecoveryReport,
}

pub struct FeedClient<C> {
    connector: C,
}

impl<C: Connector> FeedClient<C> {
    pub fn new(connector: C) -> Self {
        FeedClient { connector }
    }

    /// Request the full feed and read it into `store` until the peer closes,
    /// the idle timeout fires or the transport fails.
    pub fn stream_all(&self, store: &mut RecordStore) -> Result<StreamSummary, StreamError> {
        let mut conn = self.connector.connect().map_err(StreamError::Connect)?;
        conn.write_all(&STREAM_ALL_REQUEST)
            .and_then(|()| conn.flush())
            .map_err(StreamError::Request)?;
        info!("stream-all request sent; receiving feed");

        let mut reader = FrameReader::new(&mut conn);
        let mut records = 0usize;
        let mut duplicates = 0usize;
        for record in reader.by_ref() {
            records += 1;
            if store.insert(record).is_some() {
                duplicates += 1;
                debug!(seq = record.sequence, "duplicate frame replaced earlier copy");
            }
        }
        let discarded = reader.discarded();
        let end = reader.into_end().unwrap_or(StreamEnd::Closed);

        match &end {
            StreamEnd::Closed => info!(records, "feed closed by server"),
            StreamEnd::TimedOut => warn!(records, "feed idle past timeout; keeping what was received"),
            StreamEnd::Errored(e) => warn!(records, error = %e, "feed transport error; keeping what was received"),
        }
        if discarded > 0 {
            warn!(bytes = discarded, "dropping incomplete trailing frame");
        }
        Ok(StreamSummary { records, duplicates, end, discarded })
    }

    pub fn recover(&self, store: &mut RecordStore, missing: &[i32]) -> RecoveryReport {
        recovery::recover_missing(&self.connector, store, missing)
    }

    /// Stream, find gaps, recover them. Only the initial connection can fail
    /// the run.
    pub fn run(&self, store: &mut RecordStore) -> Result<RunReport, StreamError> {
        let stream = self.stream_all(store)?;
        info!(stored = store.len(), "initial stream finished");

        let gaps = gaps::analyze(store);
        info!(max_sequence = gaps.max_sequence, missing = gaps.missing.len(), "gap analysis");

        let recovery = if gaps.is_complete() {
            RecoveryReport::default()
        } else {
            self.recover(store, &gaps.missing)
        };
        if !recovery.abandoned.is_empty() {
            warn!(sequences = ?recovery.abandoned, "sequences still missing after recovery");
        }
        info!(stored = store.len(), "run complete");
        Ok(RunReport { stream, gaps, recovery })
    }
}
