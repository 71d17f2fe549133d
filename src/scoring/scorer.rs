use crate::search::fuzzy::MatchKind;

/// Turns a single term hit into a relevance contribution
pub trait Scorer: Send + Sync {
    fn score(&self, field_weight: f32, kind: MatchKind) -> f32;

    fn name(&self) -> &str;
}

/// Field weight scaled by how closely the query token matched the term
#[derive(Debug, Clone)]
pub struct ClosenessScorer {
    pub exact: f32,
    pub prefix: f32,
    pub infix: f32,
    pub fuzzy: f32,  // divided by (edits + 1)
}

impl Default for ClosenessScorer {
    fn default() -> Self {
        ClosenessScorer {
            exact: 1.0,
            prefix: 0.8,
            infix: 0.6,
            fuzzy: 0.5,
        }
    }
}

impl Scorer for ClosenessScorer {
    fn score(&self, field_weight: f32, kind: MatchKind) -> f32 {
        let closeness = match kind {
            MatchKind::Exact => self.exact,
            MatchKind::Prefix => self.prefix,
            MatchKind::Infix => self.infix,
            MatchKind::Fuzzy(edits) => self.fuzzy / (edits as f32 + 1.0),
        };
        field_weight * closeness
    }

    fn name(&self) -> &str {
        "closeness"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closer_matches_score_higher() {
        let scorer = ClosenessScorer::default();
        let exact = scorer.score(4.0, MatchKind::Exact);
        let prefix = scorer.score(4.0, MatchKind::Prefix);
        let infix = scorer.score(4.0, MatchKind::Infix);
        let one = scorer.score(4.0, MatchKind::Fuzzy(1));
        let two = scorer.score(4.0, MatchKind::Fuzzy(2));
        assert!(exact > prefix && prefix > infix && infix > one && one > two);
        assert!(scorer.score(1.0, MatchKind::Exact) < exact);
    }
}
