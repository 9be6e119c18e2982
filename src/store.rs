use std::collections::BTreeMap;

use crate::record::Record;

/// Records keyed by sequence number, iterated in ascending order.
///
/// Inserting a sequence that is already present replaces the old record
/// (last write wins); this is how both duplicate stream frames and recovered
/// records are applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordStore {
    records: BTreeMap<i32, Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` under its own sequence, returning the record it replaced.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.sequence, record)
    }

    pub fn get(&self, sequence: i32) -> Option<&Record> {
        self.records.get(&sequence)
    }

    pub fn contains(&self, sequence: i32) -> bool {
        self.records.contains_key(&sequence)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Greatest sequence present, if any.
    pub fn max_sequence(&self) -> Option<i32> {
        self.records.last_key_value().map(|(seq, _)| *seq)
    }

    pub fn sequences(&self) -> impl Iterator<Item = i32> + '_ {
        self.records.keys().copied()
    }

    /// Ascending by sequence.
    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.records.values()
    }
}

impl Extend<Record> for RecordStore {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut store = RecordStore::new();
        store.extend(iter);
        store
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::collections::btree_map::Values<'a, i32, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
