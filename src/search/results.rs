use std::cmp::Ordering;
use std::collections::HashMap;
use roaring::RoaringBitmap;

/// Record ordinal with its relevance score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRecord {
    pub ordinal: u32,
    pub score: f32,
}

/// Best score per record for one query token
pub type TokenHits = HashMap<u32, f32>;

/// Keeps the best contribution of a term hit for a record
pub fn record_hit(hits: &mut TokenHits, ordinal: u32, score: f32) {
    hits.entry(ordinal)
        .and_modify(|best| {
            if score > *best {
                *best = score;
            }
        })
        .or_insert(score);
}

/// Conjunction over query tokens: a record survives only if every token hit it.
/// Scores add up across tokens.
#[derive(Debug, Default)]
pub struct HitCollector {
    alive: Option<RoaringBitmap>,
    scores: HashMap<u32, f32>,
}

impl HitCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&mut self, hits: TokenHits) {
        let matched: RoaringBitmap = hits.keys().copied().collect();

        let alive = match self.alive.take() {
            Some(alive) => alive & matched,
            None => matched,
        };

        for (ordinal, score) in hits {
            if alive.contains(ordinal) {
                *self.scores.entry(ordinal).or_insert(0.0) += score;
            }
        }
        self.scores.retain(|ordinal, _| alive.contains(*ordinal));
        self.alive = Some(alive);
    }

    /// True once no record can match any more
    pub fn is_exhausted(&self) -> bool {
        self.alive.as_ref().is_some_and(|alive| alive.is_empty())
    }

    /// Highest score first, snapshot order on ties
    pub fn finish(self) -> Vec<ScoredRecord> {
        let mut results: Vec<ScoredRecord> = self.scores
            .into_iter()
            .map(|(ordinal, score)| ScoredRecord { ordinal, score })
            .collect();

        results.sort_by(|a, b| {
            b.score.total_cmp(&a.score)
                .then_with(|| a.ordinal.cmp(&b.ordinal))
        });
        results
    }
}

impl Eq for ScoredRecord {}

impl PartialOrd for ScoredRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
            .then_with(|| other.ordinal.cmp(&self.ordinal))
    }
}
