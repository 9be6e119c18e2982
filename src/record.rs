use std::fmt;

/// Size of one record on the wire: `symbol[4] | side[1] | quantity[4] | price[4] | sequence[4]`.
pub const RECORD_SIZE: usize = 17;

const SYMBOL: usize = 0;
const SIDE: usize = 4;
const QUANTITY: usize = 5;
const PRICE: usize = 9;
const SEQUENCE: usize = 13;

/// One decoded market-data record. Fields are kept exactly as they arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub symbol: [u8; 4], // ASCII, right-padded with spaces or NULs
    pub side: u8,        // b'B' / b'S', not validated
    pub quantity: i32,
    pub price: i32,
    pub sequence: i32, // unique key within a feed session
}

impl Record {
    /// Decode a 17-byte frame by fixed offsets. Integers are big-endian.
    ///
    /// There is no validation: any 17 bytes decode into some `Record`.
    pub fn decode(frame: &[u8; RECORD_SIZE]) -> Self {
        let be_i32 = |at: usize| i32::from_be_bytes([frame[at], frame[at + 1], frame[at + 2], frame[at + 3]]);
        Record {
            symbol: [frame[SYMBOL], frame[SYMBOL + 1], frame[SYMBOL + 2], frame[SYMBOL + 3]],
            side: frame[SIDE],
            quantity: be_i32(QUANTITY),
            price: be_i32(PRICE),
            sequence: be_i32(SEQUENCE),
        }
    }

    /// Inverse of [`Record::decode`]; used by feed simulators and tests.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[SYMBOL..SIDE].copy_from_slice(&self.symbol);
        out[SIDE] = self.side;
        out[QUANTITY..PRICE].copy_from_slice(&self.quantity.to_be_bytes());
        out[PRICE..SEQUENCE].copy_from_slice(&self.price.to_be_bytes());
        out[SEQUENCE..].copy_from_slice(&self.sequence.to_be_bytes());
        out
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seq={} symbol={} side={} qty={} price={}",
            self.sequence,
            String::from_utf8_lossy(&self.symbol),
            char::from(self.side),
            self.quantity,
            self.price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_fixed_offsets_big_endian() {
        let mut frame = [0u8; RECORD_SIZE];
        frame[..4].copy_from_slice(b"MSFT");
        frame[4] = b'B';
        frame[5..9].copy_from_slice(&[0x00, 0x00, 0x01, 0x2C]); // 300
        frame[9..13].copy_from_slice(&[0x00, 0x01, 0x86, 0xA0]); // 100_000
        frame[13..17].copy_from_slice(&[0x00, 0x00, 0x00, 0x07]);
        let r = Record::decode(&frame);
        assert_eq!(&r.symbol, b"MSFT");
        assert_eq!(r.side, b'B');
        assert_eq!(r.quantity, 300);
        assert_eq!(r.price, 100_000);
        assert_eq!(r.sequence, 7);
    }

    #[test]
    fn decode_negative_and_garbage_is_accepted() {
        let mut frame = [0xFFu8; RECORD_SIZE];
        frame[4] = b'?';
        let r = Record::decode(&frame);
        assert_eq!(r.side, b'?');
        assert_eq!(r.quantity, -1);
        assert_eq!(r.price, -1);
        assert_eq!(r.sequence, -1);
        assert_eq!(r.symbol, [0xFF; 4]);
    }

    #[test]
    fn encode_matches_wire_layout() {
        let r = Record { symbol: *b"AB\0\0", side: b'S', quantity: 1, price: -2, sequence: 258 };
        let bytes = r.encode();
        assert_eq!(&bytes[..5], b"AB\0\0S");
        assert_eq!(&bytes[5..9], &[0, 0, 0, 1]);
        assert_eq!(&bytes[9..13], &[0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(&bytes[13..], &[0, 0, 1, 2]);
        assert_eq!(Record::decode(&bytes), r);
    }

    #[test]
    fn display_is_single_line() {
        let r = Record { symbol: *b"AAPL", side: b'S', quantity: 5, price: 10, sequence: 3 };
        assert_eq!(r.to_string(), "seq=3 symbol=AAPL side=S qty=5 price=10");
    }
}
