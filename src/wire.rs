//! Client-to-server request encoding.
//!
//! Two requests exist. `StreamAll` is a single byte; the server answers with
//! back-to-back records until it closes or goes idle. `Resend` is two bytes,
//! the second being the target sequence as an unsigned byte, and the server
//! answers with exactly one record.

/// Request discriminator, first byte of every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestKind {
    StreamAll = 0x01,
    Resend = 0x02,
}

pub const STREAM_ALL_REQUEST: [u8; 1] = [RequestKind::StreamAll as u8];

/// Highest sequence number a resend request can address.
pub const MAX_ADDRESSABLE: i32 = u8::MAX as i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResendRequest {
    sequence: i32,
}

impl ResendRequest {
    pub fn new(sequence: i32) -> Self {
        ResendRequest { sequence }
    }

    pub fn sequence(&self) -> i32 {
        self.sequence
    }

    /// Whether the sequence fits the one-byte field without truncation.
    pub fn is_addressable(&self) -> bool {
        (0..=MAX_ADDRESSABLE).contains(&self.sequence)
    }

    /// The byte actually put on the wire for the sequence (low 8 bits).
    pub fn sequence_byte(&self) -> u8 {
        self.sequence as u8
    }

    pub fn encode(&self) -> [u8; 2] {
        [RequestKind::Resend as u8, self.sequence_byte()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_all_is_one_byte() {
        assert_eq!(STREAM_ALL_REQUEST, [0x01]);
    }

    #[test]
    fn resend_in_range() {
        let req = ResendRequest::new(3);
        assert!(req.is_addressable());
        assert_eq!(req.encode(), [0x02, 3]);
        assert_eq!(ResendRequest::new(255).encode(), [0x02, 0xFF]);
        assert!(ResendRequest::new(0).is_addressable());
    }

    #[test]
    fn resend_out_of_range_truncates() {
        let req = ResendRequest::new(256);
        assert!(!req.is_addressable());
        assert_eq!(req.encode(), [0x02, 0x00]);

        let req = ResendRequest::new(300);
        assert_eq!(req.sequence_byte(), 44);
        assert!(!ResendRequest::new(-1).is_addressable());
        assert_eq!(ResendRequest::new(-1).encode(), [0x02, 0xFF]);
    }
}
