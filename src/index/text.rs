use std::collections::{BTreeMap, HashMap};
use fst::{IntoStreamer, Set, Streamer};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::SearchConfig;
use crate::core::error::Result;
use crate::core::types::Record;
use crate::schema::fields::{SearchSchema, TextField};
use crate::scoring::scorer::{ClosenessScorer, Scorer};
use crate::search::fuzzy::{FuzzyBuilders, TermMatcher};
use crate::search::results::{record_hit, HitCollector, ScoredRecord, TokenHits};

/// A record's occurrence of a term, in its highest-weighted field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub ordinal: u32,
    pub field: TextField,
}

/// A term as seen from the record side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTerm {
    pub term: String,
    pub field: TextField,
}

/// Fuzzy multi-field text index.
///
/// `dictionary` is an FST over every distinct folded term and drives the
/// global search. `forward` keeps each record's own terms so a narrowed
/// candidate pool can be re-scanned without touching the dictionary.
pub struct TextIndex {
    dictionary: Set<Vec<u8>>,
    postings: BTreeMap<String, Vec<Posting>>,
    forward: Vec<Vec<FieldTerm>>,
    schema: SearchSchema,
    scorer: ClosenessScorer,
    builders: FuzzyBuilders,
    analyzer: Analyzer,
    config: SearchConfig,
}

impl TextIndex {
    pub fn build(records: &[Record], schema: SearchSchema, config: SearchConfig) -> Result<Self> {
        let analyzer = Analyzer::catalog();
        let mut postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
        let mut forward = Vec::with_capacity(records.len());

        for (ordinal, record) in records.iter().enumerate() {
            let ordinal = ordinal as u32;

            // term -> best field for this record
            let mut best: HashMap<String, TextField> = HashMap::new();
            for definition in &schema.fields {
                for value in definition.field.values(record) {
                    for term in analyzer.terms(value) {
                        best.entry(term)
                            .and_modify(|field| {
                                if definition.weight > schema.weight(*field) {
                                    *field = definition.field;
                                }
                            })
                            .or_insert(definition.field);
                    }
                }
            }

            let mut terms: Vec<FieldTerm> = best
                .into_iter()
                .map(|(term, field)| FieldTerm { term, field })
                .collect();
            terms.sort_by(|a, b| a.term.cmp(&b.term));

            for field_term in &terms {
                postings.entry(field_term.term.clone())
                    .or_default()
                    .push(Posting { ordinal, field: field_term.field });
            }
            forward.push(terms);
        }

        // BTreeMap keys are already in byte order, as the FST requires
        let dictionary = Set::from_iter(postings.keys())?;

        Ok(TextIndex {
            dictionary,
            postings,
            forward,
            schema,
            scorer: ClosenessScorer::default(),
            builders: FuzzyBuilders::new(config.transpositions),
            analyzer,
            config,
        })
    }

    pub fn term_count(&self) -> usize {
        self.dictionary.len()
    }

    pub fn record_count(&self) -> usize {
        self.forward.len()
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn scorer(&self) -> &dyn Scorer {
        &self.scorer
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// One matcher per analyzed query token; empty when the text has no words
    pub fn matchers(&self, text: &str) -> Vec<TermMatcher> {
        self.analyzer
            .terms(text)
            .iter()
            .map(|token| TermMatcher::new(token, &self.config, &self.builders))
            .collect()
    }

    /// Search over the whole snapshot through the term dictionary
    pub fn search(&self, text: &str) -> Vec<ScoredRecord> {
        let matchers = self.matchers(text);
        if matchers.is_empty() {
            return Vec::new();
        }

        let mut collector = HitCollector::new();
        for matcher in &matchers {
            collector.add_token(self.dictionary_hits(matcher));
            if collector.is_exhausted() {
                break;
            }
        }
        collector.finish()
    }

    /// Same matching as `search`, confined to `candidates`
    pub fn search_within(&self, text: &str, candidates: &[u32]) -> Vec<ScoredRecord> {
        let matchers = self.matchers(text);
        if matchers.is_empty() || candidates.is_empty() {
            return Vec::new();
        }

        let mut collector = HitCollector::new();
        for matcher in &matchers {
            collector.add_token(self.forward_hits(matcher, candidates));
            if collector.is_exhausted() {
                break;
            }
        }
        collector.finish()
    }

    fn dictionary_hits(&self, matcher: &TermMatcher) -> TokenHits {
        let mut hits = TokenHits::new();

        // Exact, prefix and typo candidates straight from the automaton
        let mut stream = self.dictionary.search(matcher.automaton()).into_stream();
        while let Some(key) = stream.next() {
            self.collect_term(key, matcher, &mut hits);
        }

        // Infix hits cannot be reached by a prefix automaton
        if matcher.allows_infix() {
            let mut stream = self.dictionary.stream();
            while let Some(key) = stream.next() {
                self.collect_term(key, matcher, &mut hits);
            }
        }

        hits
    }

    fn collect_term(&self, key: &[u8], matcher: &TermMatcher, hits: &mut TokenHits) {
        let Ok(term) = std::str::from_utf8(key) else {
            return;
        };
        let Some(kind) = matcher.classify(term) else {
            return;
        };
        let Some(postings) = self.postings.get(term) else {
            return;
        };

        for posting in postings {
            let score = self.scorer.score(self.schema.weight(posting.field), kind);
            record_hit(hits, posting.ordinal, score);
        }
    }

    fn forward_hits(&self, matcher: &TermMatcher, candidates: &[u32]) -> TokenHits {
        let mut hits = TokenHits::new();

        for &ordinal in candidates {
            let Some(terms) = self.forward.get(ordinal as usize) else {
                continue;
            };
            for field_term in terms {
                if let Some(kind) = matcher.classify(&field_term.term) {
                    let score = self.scorer.score(self.schema.weight(field_term.field), kind);
                    record_hit(&mut hits, ordinal, score);
                }
            }
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Expansion, Faction, MountCategory, SourceType};

    fn records() -> Vec<Record> {
        vec![
            Record::new("onyxian-drake", "Onyxian Drake", Expansion::WrathOfTheLichKing,
                        MountCategory::Flying, Faction::Neutral, SourceType::Drop, "Onyxia (25)")
                .with_zone("Onyxia's Lair")
                .with_tags(&["raid", "drop"]),
            Record::new("swift-zhevra", "Swift Zhevra", Expansion::WrathOfTheLichKing,
                        MountCategory::Ground, Faction::Neutral, SourceType::Promotion, "Recruit-A-Friend"),
            Record::new("reins-of-the-crimson-deathcharger", "Reins of the Crimson Deathcharger",
                        Expansion::WrathOfTheLichKing, MountCategory::Ground, Faction::Neutral,
                        SourceType::Quest, "Shadowmourne questline")
                .with_zone("Icecrown Citadel"),
            Record::new("jade-pandaren-kite", "Jade Pandaren Kite", Expansion::MistsOfPandaria,
                        MountCategory::Flying, Faction::Neutral, SourceType::Promotion, "Trading Card Game")
                .with_tags(&["tcg"]),
        ]
    }

    fn index() -> TextIndex {
        TextIndex::build(&records(), SearchSchema::mounts(), SearchConfig::default()).unwrap()
    }

    fn ordinals(results: &[ScoredRecord]) -> Vec<u32> {
        let mut ordinals: Vec<u32> = results.iter().map(|r| r.ordinal).collect();
        ordinals.sort();
        ordinals
    }

    #[test]
    fn dictionary_holds_each_folded_term_once() {
        let index = index();
        assert!(index.postings("onyxian").is_some());
        assert!(index.postings("Onyxian").is_none());
        // "onyxia" occurs in detail and zone of one record: one posting
        assert_eq!(index.postings("onyxia").map(|p| p.len()), Some(1));
        assert_eq!(index.record_count(), 4);
    }

    #[test]
    fn posting_keeps_highest_weighted_field() {
        let index = index();
        let postings = index.postings("drop").unwrap();
        assert_eq!(postings[0].field, TextField::Tags);
        let postings = index.postings("drake").unwrap();
        assert_eq!(postings[0].field, TextField::Name);
    }

    #[test]
    fn matches_across_fields_with_typos() {
        let index = index();
        assert_eq!(ordinals(&index.search("onyxain")), vec![0]);
        assert_eq!(ordinals(&index.search("icecrown")), vec![2]);
        assert_eq!(ordinals(&index.search("tcg")), vec![3]);
        assert_eq!(ordinals(&index.search("deathchrager")), vec![2]);
    }

    #[test]
    fn all_tokens_must_match() {
        let index = index();
        assert_eq!(ordinals(&index.search("swift zhevra")), vec![1]);
        assert!(index.search("swift kite").is_empty());
    }

    #[test]
    fn infix_substrings_match() {
        let index = index();
        assert_eq!(ordinals(&index.search("charger")), vec![2]);
    }

    #[test]
    fn name_hits_rank_above_tag_hits() {
        let records = vec![
            Record::new("a", "Tundra Mammoth", Expansion::WrathOfTheLichKing, MountCategory::Ground,
                        Faction::Neutral, SourceType::Vendor, "Dalaran").with_tags(&["drake"]),
            Record::new("b", "Red Drake", Expansion::WrathOfTheLichKing, MountCategory::Flying,
                        Faction::Neutral, SourceType::Vendor, "Wyrmrest Accord"),
        ];
        let index = TextIndex::build(&records, SearchSchema::mounts(), SearchConfig::default()).unwrap();
        let results = index.search("drake");
        assert_eq!(results.iter().map(|r| r.ordinal).collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn narrowed_scan_agrees_with_dictionary() {
        let index = index();
        let everyone = [0, 1, 2, 3];
        for query in ["onyxain", "drake", "rein", "pandaren kite", "ad", "x", "questline", "zzz"] {
            assert_eq!(
                ordinals(&index.search(query)),
                ordinals(&index.search_within(query, &everyone)),
                "query {query:?}"
            );
        }
        assert_eq!(ordinals(&index.search_within("drake", &[1, 2, 3])), Vec::<u32>::new());
    }

    #[test]
    fn wordless_text_matches_nothing() {
        assert!(index().search("!!!").is_empty());
    }
}
