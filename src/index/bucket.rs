use std::collections::HashMap;
use roaring::RoaringBitmap;
use crate::core::types::{Expansion, Record};

/// Classification -> record ordinals, in snapshot order
#[derive(Debug, Default)]
pub struct BucketIndex {
    buckets: HashMap<Expansion, Vec<u32>>,
}

impl BucketIndex {
    pub fn build(records: &[Record]) -> Self {
        let mut buckets: HashMap<Expansion, Vec<u32>> = HashMap::new();
        for (ordinal, record) in records.iter().enumerate() {
            buckets.entry(record.classification())
                .or_default()
                .push(ordinal as u32);
        }
        BucketIndex { buckets }
    }

    /// Ordinals of one bucket; empty for a classification with no records
    pub fn get(&self, classification: Expansion) -> &[u32] {
        self.buckets
            .get(&classification)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Union of several buckets, ascending (= snapshot order)
    pub fn union<'a, I>(&self, classifications: I) -> Vec<u32>
    where
        I: IntoIterator<Item = &'a Expansion>,
    {
        let mut pool = RoaringBitmap::new();
        for classification in classifications {
            pool.extend(self.get(*classification).iter().copied());
        }
        pool.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
