//! JSON rendering of the finished store.
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::record::Record;
use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    pub symbol: String,
    pub buysell_indicator: String,
    pub quantity: i32,
    pub price: i32,
    #[serde(rename = "packetSequence")]
    pub packet_sequence: i32,
}

impl From<&Record> for OutputRecord {
    fn from(r: &Record) -> Self {
        OutputRecord {
            symbol: trim_symbol(&r.symbol),
            buysell_indicator: char::from(r.side).to_string(),
            quantity: r.quantity,
            price: r.price,
            packet_sequence: r.sequence,
        }
    }
}

/// Strip the right-hand space/NUL padding of a wire symbol.
pub fn trim_symbol(raw: &[u8; 4]) -> String {
    let end = raw.iter().rposition(|b| *b != b' ' && *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Write the store as a 4-space indented JSON array, ascending by sequence.
pub fn write_json<W: Write>(store: &RecordStore, mut w: W) -> Result<()> {
    {
        let mut ser = serde_json::Serializer::with_formatter(&mut w, PrettyFormatter::with_indent(b"    "));
        (&mut ser).collect_seq(store.iter().map(OutputRecord::from)).context("encode records")?;
    }
    w.write_all(b"\n")?;
    Ok(())
}

pub fn write_json_file(store: &RecordStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
    }
    let file = File::create(path).with_context(|| format!("create {:?}", path))?;
    let mut w = BufWriter::new(file);
    write_json(store, &mut w).with_context(|| format!("write {:?}", path))?;
    w.flush().with_context(|| format!("flush {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_padding_only() {
        assert_eq!(trim_symbol(b"AB\0\0"), "AB");
        assert_eq!(trim_symbol(b"    "), "");
        assert_eq!(trim_symbol(b"\0\0\0\0"), "");
        assert_eq!(trim_symbol(b"MSFT"), "MSFT");
        assert_eq!(trim_symbol(b" A  "), " A");
        assert_eq!(trim_symbol(b"A \0 "), "A");
    }

    #[test]
    fn empty_store_is_empty_array() {
        let mut out = Vec::new();
        write_json(&RecordStore::new(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }

    #[test]
    fn layout_and_field_names() {
        let store: RecordStore = [
            Record { symbol: *b"MSFT", side: b'S', quantity: 50, price: 101, sequence: 2 },
            Record { symbol: *b"AB  ", side: b'B', quantity: 100, price: 5000, sequence: 1 },
        ]
        .into_iter()
        .collect();
        let mut out = Vec::new();
        write_json(&store, &mut out).unwrap();
        let expected = r#"[
    {
        "symbol": "AB",
        "buysell_indicator": "B",
        "quantity": 100,
        "price": 5000,
        "packetSequence": 1
    },
    {
        "symbol": "MSFT",
        "buysell_indicator": "S",
        "quantity": 50,
        "price": 101,
        "packetSequence": 2
    }
]
"#;
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn file_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        let store: RecordStore = [Record { symbol: *b"X\0\0\0", side: b'B', quantity: 1, price: 2, sequence: 3 }]
            .into_iter()
            .collect();
        write_json_file(&store, &path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v[0]["symbol"], "X");
        assert_eq!(v[0]["packetSequence"], 3);
    }

    #[test]
    fn unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a file.
        assert!(write_json_file(&RecordStore::new(), dir.path()).is_err());
    }
}
