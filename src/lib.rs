//! Gap-recovering client for a fixed-length binary market-data feed.
//!
//! The feed server streams 17-byte records back to back with no terminator.
//! This crate reads everything it can, works out which sequence numbers never
//! arrived and fetches each of them over its own resend connection:
//!
//! - `record`: the 17-byte wire record and its decoder
//! - `wire`: stream-all and resend request encoding
//! - `reassembler`: frame reassembly over a chunked byte stream and the
//!   closed / timed-out / errored end-of-stream classification
//! - `store`: ordered, last-write-wins record store
//! - `gaps`: missing-sequence analysis
//! - `transport`: connection factory (`Connector`) and its TCP implementation
//! - `recovery`: the per-sequence resend session
//! - `client`: ties the phases together
//! - `output`: JSON rendering of the final store
//!
//! The `feed_recovery` binary (`src/main.rs`) wires these to the command line.
pub mod client;
pub mod gaps;
pub mod output;
pub mod reassembler;
pub mod record;
pub mod recovery;
pub mod store;
pub mod transport;
pub mod wire;
