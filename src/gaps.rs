use crate::store::RecordStore;

/// Result of comparing the store against the contiguous range `[1, max]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapAnalysis {
    /// Greatest key present, or 0 for an empty store (or one holding only
    /// non-positive keys).
    pub max_sequence: i32,
    /// Absent sequences in ascending order.
    pub missing: Vec<i32>,
}

impl GapAnalysis {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compute the missing-sequence set. Sequence numbering starts at 1, so 0
/// and negative keys never count as missing.
///
/// Walks the stored keys once instead of probing every value in the range.
pub fn analyze(store: &RecordStore) -> GapAnalysis {
    let max_sequence = store.max_sequence().unwrap_or(0).max(0);
    let mut missing = Vec::new();
    let mut expected = 1i32;
    for seq in store.sequences().filter(|s| *s >= 1) {
        missing.extend(expected..seq);
        expected = match seq.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }
    GapAnalysis { max_sequence, missing }
}
