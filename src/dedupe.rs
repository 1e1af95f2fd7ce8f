//! Identity-keyed de-duplication.
//!
//! The catalog assembles some category payloads from an id-keyed map converted
//! to an array and has been observed to emit the same record more than once.
//! Records sharing an `id` are collapsed to the first occurrence, preserving
//! input order.

use crate::normalize::NormalizedRecord;
use std::collections::HashSet;

/// Remove records sharing the same `id`, keeping first-seen order
pub fn dedupe(records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .collect()
}
