use std::sync::Arc;
use tracing::debug;
use crate::analysis::analyzer::normalize_text;
use crate::core::types::{Expansion, Record, Selection};
use crate::index::builder::SearchIndex;
use crate::query::types::{CatalogQuery, OwnershipFilter, OwnershipLookup};
use crate::search::results::ScoredRecord;

/// Read-only queries over one built `SearchIndex`.
///
/// Cloning is cheap and every clone keeps its index alive, so an engine
/// obtained before a dataset reload keeps answering from the old snapshot.
#[derive(Clone)]
pub struct QueryEngine {
    index: Arc<SearchIndex>,
}

impl QueryEngine {
    pub fn new(index: Arc<SearchIndex>) -> Self {
        QueryEngine { index }
    }

    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    pub fn by_id(&self, id: &str) -> Option<&Record> {
        self.index
            .identity()
            .get(id)
            .and_then(|ordinal| self.index.record(ordinal))
    }

    pub fn by_classification(&self, selection: &Selection<Expansion>) -> Vec<&Record> {
        match selection {
            Selection::All => self.index.records().iter().collect(),
            Selection::Only(classification) => {
                self.resolve(self.index.buckets().get(*classification).iter().copied())
            }
        }
    }

    /// `"all"` or a classification display name; anything else is an empty bucket
    pub fn by_classification_str(&self, value: &str) -> Vec<&Record> {
        match value.parse::<Selection<Expansion>>() {
            Ok(selection) => self.by_classification(&selection),
            Err(_) => Vec::new(),
        }
    }

    /// Blank text returns the whole snapshot in order
    pub fn search(&self, text: &str) -> Vec<&Record> {
        if text.trim().is_empty() {
            return self.index.records().iter().collect();
        }
        let hits = self.global_hits(text);
        self.resolve(hits.iter().map(|hit| hit.ordinal))
    }

    /// Conjunction of every filter in `query`.
    ///
    /// Applied cheapest first: classification buckets, facet equality,
    /// ownership, then fuzzy text over whatever is left.
    pub fn combined(&self, query: &CatalogQuery, ownership: &dyn OwnershipLookup) -> Vec<&Record> {
        let records = self.index.records();

        // Unfiltered text search can use the dictionary and the cache
        if query.is_unfiltered() {
            return self.search(&query.text);
        }

        let mut pool: Vec<u32> = if query.classifications.is_empty() {
            (0..records.len() as u32).collect()
        } else {
            self.index.buckets().union(&query.classifications)
        };

        if query.has_facet_filters() {
            pool.retain(|&ordinal| query.matches_facets(&records[ordinal as usize]));
        }

        if query.ownership != OwnershipFilter::All {
            pool.retain(|&ordinal| {
                query.ownership.accepts(ownership.is_owned(&records[ordinal as usize].id))
            });
        }

        debug!(
            target: "mountdex::query",
            pool = pool.len(),
            classifications = query.classifications.len(),
            ownership = %query.ownership,
            "Structural filters applied"
        );

        if !query.has_text() {
            return self.resolve(pool);
        }

        let hits = self.index.text().search_within(&query.text, &pool);
        self.resolve(hits.iter().map(|hit| hit.ordinal))
    }

    fn global_hits(&self, text: &str) -> Arc<Vec<ScoredRecord>> {
        let key = normalize_text(text);
        self.index
            .cache()
            .get_or_insert_with(&key, || self.index.text().search(text))
    }

    fn resolve<I>(&self, ordinals: I) -> Vec<&Record>
    where
        I: IntoIterator<Item = u32>,
    {
        ordinals
            .into_iter()
            .filter_map(|ordinal| self.index.record(ordinal))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use crate::core::types::{DatasetSnapshot, Faction, MountCategory, SourceType};
    use crate::index::builder::IndexBuilder;
    use crate::query::types::NoOwnership;

    fn engine() -> QueryEngine {
        let records = vec![
            Record::new("black-stallion", "Black Stallion", Expansion::Classic, MountCategory::Ground,
                        Faction::Alliance, SourceType::Vendor, "Stormwind City"),
            Record::new("red-drake", "Red Drake", Expansion::WrathOfTheLichKing, MountCategory::Flying,
                        Faction::Neutral, SourceType::Vendor, "Wyrmrest Accord"),
            Record::new("black-war-kodo", "Black War Kodo", Expansion::Classic, MountCategory::Ground,
                        Faction::Horde, SourceType::Other, "Retired PvP reward"),
            Record::new("heavenly-onyx-cloud-serpent", "Heavenly Onyx Cloud Serpent",
                        Expansion::MistsOfPandaria, MountCategory::Flying, Faction::Neutral,
                        SourceType::Drop, "Sha of Anger").with_zone("Kun-Lai Summit"),
        ];
        let index = IndexBuilder::default()
            .build(Arc::new(DatasetSnapshot::from_records(records)))
            .unwrap();
        QueryEngine::new(Arc::new(index))
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn by_id_finds_exact_record_or_nothing() {
        let engine = engine();
        assert_eq!(engine.by_id("red-drake").map(|r| r.name.as_str()), Some("Red Drake"));
        assert!(engine.by_id("red").is_none());
        assert!(engine.by_id("").is_none());
    }

    #[test]
    fn by_classification_handles_all_known_and_unknown() {
        let engine = engine();
        assert_eq!(engine.by_classification_str("all").len(), 4);
        assert_eq!(ids(&engine.by_classification_str("Classic")), vec!["black-stallion", "black-war-kodo"]);
        assert!(engine.by_classification_str("Legion").is_empty());
        assert!(engine.by_classification(&Selection::Only(Expansion::Cataclysm)).is_empty());
    }

    #[test]
    fn blank_search_returns_snapshot_in_order() {
        let engine = engine();
        let all = ids(&engine.search(""));
        assert_eq!(all, ids(&engine.search("  \t ")));
        assert_eq!(all, vec!["black-stallion", "red-drake", "black-war-kodo", "heavenly-onyx-cloud-serpent"]);
    }

    #[test]
    fn search_is_case_and_accent_insensitive() {
        let engine = engine();
        assert_eq!(ids(&engine.search("KÚN-lai")), vec!["heavenly-onyx-cloud-serpent"]);
        assert_eq!(ids(&engine.search("wyrmrest")), vec!["red-drake"]);
    }

    #[test]
    fn repeated_search_hits_cache() {
        let engine = engine();
        engine.search("black");
        engine.search(" Black ");
        let stats = engine.index().cache_stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
    }

    #[test]
    fn combined_applies_every_filter() {
        let engine = engine();
        let owned: HashSet<String> = HashSet::from(["black-war-kodo".to_string()]);

        let query = CatalogQuery::new()
            .with_classification(Expansion::Classic)
            .with_category(MountCategory::Ground);
        assert_eq!(ids(&engine.combined(&query, &owned)), vec!["black-stallion", "black-war-kodo"]);

        let query = query.with_ownership(OwnershipFilter::NotOwned);
        assert_eq!(ids(&engine.combined(&query, &owned)), vec!["black-stallion"]);

        let query = CatalogQuery::new()
            .with_text("black")
            .with_faction(Faction::Horde);
        assert_eq!(ids(&engine.combined(&query, &owned)), vec!["black-war-kodo"]);
    }

    #[test]
    fn multi_select_classification_is_or() {
        let engine = engine();
        let query = CatalogQuery::new()
            .with_classification(Expansion::MistsOfPandaria)
            .with_classification(Expansion::WrathOfTheLichKing);
        assert_eq!(ids(&engine.combined(&query, &NoOwnership)), vec!["red-drake", "heavenly-onyx-cloud-serpent"]);
    }

    #[test]
    fn narrowed_text_search_matches_global_membership() {
        let engine = engine();
        let everyone = CatalogQuery::new()
            .with_text("blak")
            .with_ownership(OwnershipFilter::NotOwned);
        let mut narrowed = ids(&engine.combined(&everyone, &NoOwnership));
        let mut global = ids(&engine.search("blak"));
        narrowed.sort();
        global.sort();
        assert_eq!(narrowed, global);
        assert_eq!(global, vec!["black-stallion", "black-war-kodo"]);
    }

    #[test]
    fn unfiltered_combined_equals_search() {
        let engine = engine();
        let query = CatalogQuery::new().with_text("drake");
        assert_eq!(ids(&engine.combined(&query, &NoOwnership)), ids(&engine.search("drake")));
        assert_eq!(engine.combined(&CatalogQuery::new(), &NoOwnership).len(), 4);
    }
}
