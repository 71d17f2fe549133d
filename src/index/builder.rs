use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use crate::core::config::SearchConfig;
use crate::core::error::Result;
use crate::core::types::{DatasetSnapshot, Record};
use crate::index::bucket::BucketIndex;
use crate::index::identity::IdentityIndex;
use crate::index::text::TextIndex;
use crate::query::cache::{CacheStats, QueryCache};
use crate::schema::fields::SearchSchema;

/// All derived structures for one snapshot. Never mutated after build;
/// a new snapshot gets a new `SearchIndex`.
pub struct SearchIndex {
    snapshot: Arc<DatasetSnapshot>,
    text: TextIndex,
    buckets: BucketIndex,
    identity: IdentityIndex,
    cache: QueryCache,
}

impl SearchIndex {
    pub fn snapshot(&self) -> &Arc<DatasetSnapshot> {
        &self.snapshot
    }

    pub fn records(&self) -> &[Record] {
        &self.snapshot.records
    }

    pub fn record(&self, ordinal: u32) -> Option<&Record> {
        self.snapshot.records.get(ordinal as usize)
    }

    pub fn text(&self) -> &TextIndex {
        &self.text
    }

    pub fn buckets(&self) -> &BucketIndex {
        &self.buckets
    }

    pub fn identity(&self) -> &IdentityIndex {
        &self.identity
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn data_version(&self) -> u64 {
        self.snapshot.data_version
    }
}

/// Builds a `SearchIndex` from a snapshot. Full rebuild only.
pub struct IndexBuilder {
    schema: SearchSchema,
    config: SearchConfig,
}

impl IndexBuilder {
    pub fn new(config: SearchConfig) -> Self {
        IndexBuilder {
            schema: SearchSchema::mounts(),
            config,
        }
    }

    pub fn with_schema(mut self, schema: SearchSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn build(&self, snapshot: Arc<DatasetSnapshot>) -> Result<SearchIndex> {
        let started = Instant::now();

        let text = TextIndex::build(&snapshot.records, self.schema.clone(), self.config.clone())?;
        let buckets = BucketIndex::build(&snapshot.records);
        let identity = IdentityIndex::build(&snapshot.records);

        info!(
            target: "mountdex::index",
            records = snapshot.records.len(),
            terms = text.term_count(),
            buckets = buckets.len(),
            analyzer = %text.analyzer().pipeline(),
            scorer = text.scorer().name(),
            duplicate_ids = identity.duplicates(),
            data_version = snapshot.data_version,
            duration_us = started.elapsed().as_micros() as u64,
            "Search index built"
        );

        Ok(SearchIndex {
            snapshot,
            text,
            buckets,
            identity,
            cache: QueryCache::new(self.config.query_cache_size),
        })
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Expansion, Faction, MountCategory, SourceType};

    #[test]
    fn empty_snapshot_builds_empty_indexes() {
        let index = IndexBuilder::default()
            .build(Arc::new(DatasetSnapshot::new(7, Vec::new())))
            .unwrap();
        assert_eq!(index.text().term_count(), 0);
        assert!(index.buckets().is_empty());
        assert!(index.identity().is_empty());
        assert_eq!(index.data_version(), 7);
        assert_eq!(index.text().analyzer().pipeline(), "standard>lowercase>diacritics");
        assert_eq!(index.text().scorer().name(), "closeness");
    }

    #[test]
    fn build_is_deterministic() {
        let records = vec![
            Record::new("a", "Black Stallion", Expansion::Classic, MountCategory::Ground,
                        Faction::Alliance, SourceType::Vendor, "Stormwind"),
            Record::new("b", "Black War Kodo", Expansion::Classic, MountCategory::Ground,
                        Faction::Horde, SourceType::Other, "PvP"),
        ];
        let snapshot = Arc::new(DatasetSnapshot::from_records(records));
        let first = IndexBuilder::default().build(Arc::clone(&snapshot)).unwrap();
        let second = IndexBuilder::default().build(snapshot).unwrap();

        assert_eq!(first.text().search("black"), second.text().search("black"));
        assert_eq!(first.text().term_count(), second.text().term_count());
    }
}
