//! Reassembly of fixed-size records from an unframed byte stream.
//!
//! The feed carries no delimiters, length prefixes or end-of-stream marker.
//! [`Reassembler`] turns arbitrarily sized chunks into complete records, and
//! [`FrameReader`] drives it from any `Read` source, deciding that the stream
//! is over when the peer closes, the idle timeout fires or the transport
//! fails. Which of the three happened is kept in [`StreamEnd`].
use std::fmt;
use std::io::{self, ErrorKind, Read};

use crate::record::{Record, RECORD_SIZE};

/// Read buffer size for a single `read` call on the stream.
pub const CHUNK_SIZE: usize = 1024;

/// Append-only residual buffer. Bytes in front of `head` are already decoded.
#[derive(Debug, Default)]
pub struct Reassembler {
    buf: Vec<u8>,
    head: usize,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly received bytes behind whatever is still pending.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.head > 0 {
            self.buf.drain(..self.head);
            self.head = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Decode and consume the leading frame, if a whole one is buffered.
    pub fn next_record(&mut self) -> Option<Record> {
        let window = self.buf.get(self.head..self.head + RECORD_SIZE)?;
        let frame: &[u8; RECORD_SIZE] = window.try_into().ok()?;
        let record = Record::decode(frame);
        self.head += RECORD_SIZE;
        Some(record)
    }

    /// Bytes received but not yet part of an emitted record.
    pub fn buffered(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Drop the pending fragment, returning how many bytes were thrown away.
    pub fn discard(&mut self) -> usize {
        let n = self.buffered();
        self.buf.clear();
        self.head = 0;
        n
    }
}

/// Why the stream stopped producing bytes.
#[derive(Debug)]
pub enum StreamEnd {
    /// Peer closed the connection.
    Closed,
    /// No bytes arrived within the idle timeout. Treated as soft completion.
    TimedOut,
    /// Any other transport error. Data so far is kept.
    Errored(io::Error),
}

impl StreamEnd {
    pub fn is_clean(&self) -> bool {
        matches!(self, StreamEnd::Closed)
    }
}

impl fmt::Display for StreamEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEnd::Closed => f.write_str("closed by peer"),
            StreamEnd::TimedOut => f.write_str("idle timeout"),
            StreamEnd::Errored(e) => write!(f, "transport error: {e}"),
        }
    }
}

/// Socket read timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// Lazy, non-restartable iterator of records read from `source`.
///
/// Once the iterator returns `None`, [`FrameReader::end`] tells why and
/// [`FrameReader::discarded`] how many trailing bytes did not form a record.
pub struct FrameReader<R> {
    source: R,
    reassembler: Reassembler,
    chunk: Box<[u8]>,
    end: Option<StreamEnd>,
    bytes_read: u64,
    discarded: usize,
}

impl<R: Read> FrameReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_chunk_size(source, CHUNK_SIZE)
    }

    pub fn with_chunk_size(source: R, chunk_size: usize) -> Self {
        FrameReader {
            source,
            reassembler: Reassembler::new(),
            chunk: vec![0u8; chunk_size.max(1)].into_boxed_slice(),
            end: None,
            bytes_read: 0,
            discarded: 0,
        }
    }

    pub fn end(&self) -> Option<&StreamEnd> {
        self.end.as_ref()
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Consume the reader, yielding the termination reason if it was reached.
    pub fn into_end(self) -> Option<StreamEnd> {
        self.end
    }

    fn finish(&mut self, end: StreamEnd) {
        self.discarded = self.reassembler.discard();
        self.end = Some(end);
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            if let Some(record) = self.reassembler.next_record() {
                return Some(record);
            }
            if self.end.is_some() {
                return None;
            }
            match self.source.read(&mut self.chunk) {
                Ok(0) => self.finish(StreamEnd::Closed),
                Ok(n) => {
                    self.bytes_read += n as u64;
                    self.reassembler.push(&self.chunk[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => self.finish(StreamEnd::TimedOut),
                Err(e) => self.finish(StreamEnd::Errored(e)),
            }
        }
    }
}
