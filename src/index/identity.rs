use std::collections::HashMap;
use crate::core::types::Record;

/// Primary-key lookup. Duplicate ids resolve to the last record inserted.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    ordinals: HashMap<String, u32>,
    duplicates: usize,
}

impl IdentityIndex {
    pub fn build(records: &[Record]) -> Self {
        let mut ordinals = HashMap::with_capacity(records.len());
        let mut duplicates = 0;

        for (ordinal, record) in records.iter().enumerate() {
            if ordinals.insert(record.id.clone(), ordinal as u32).is_some() {
                duplicates += 1;
            }
        }

        IdentityIndex { ordinals, duplicates }
    }

    pub fn get(&self, id: &str) -> Option<u32> {
        self.ordinals.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }

    /// Number of records shadowed by a later record with the same id
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Expansion, Faction, MountCategory, SourceType};

    #[test]
    fn last_write_wins_on_duplicate_id() {
        let make = |id: &str, name: &str| Record::new(id, name, Expansion::Classic, MountCategory::Ground,
                                                      Faction::Neutral, SourceType::Vendor, "vendor");
        let records = vec![make("x", "First"), make("y", "Other"), make("x", "Second")];
        let index = IdentityIndex::build(&records);
        assert_eq!(index.get("x"), Some(2));
        assert_eq!(index.get("y"), Some(1));
        assert_eq!(index.get("z"), None);
        assert_eq!(index.duplicates(), 1);
        assert_eq!(index.len(), 2);
    }
}
