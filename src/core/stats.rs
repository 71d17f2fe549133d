use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::core::types::Expansion;

/// Ownership progress over some set of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total: usize,
    pub owned: usize,
    pub percentage: u32,
}

impl ProgressStats {
    pub fn new(total: usize, owned: usize) -> Self {
        ProgressStats {
            total,
            owned,
            percentage: percentage(owned, total),
        }
    }
}

/// Ownership progress overall and per classification
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub global: ProgressStats,
    pub by_classification: BTreeMap<Expansion, ProgressStats>,
}

/// `round(owned / total * 100)` with halves rounded up; 0 when `total` is 0
pub fn percentage(owned: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let owned = owned as u64;
    let total = total as u64;
    ((owned * 200 + total) / (total * 2)) as u32
}
