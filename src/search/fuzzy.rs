use fst::Automaton;
use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, DFA, SINK_STATE};
use crate::core::config::SearchConfig;

/// Largest edit budget any query token can get
pub const MAX_EDIT_DISTANCE: u8 = 2;

/// How a query token matched an indexed term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Prefix,
    Infix,
    Fuzzy(u8),
}

/// Levenshtein automaton builders for budgets 0..=MAX_EDIT_DISTANCE.
/// Building one is costly, so they are made once per index.
pub struct FuzzyBuilders {
    builders: Vec<LevenshteinAutomatonBuilder>,
}

impl FuzzyBuilders {
    pub fn new(transpositions: bool) -> Self {
        let builders = (0..=MAX_EDIT_DISTANCE)
            .map(|distance| LevenshteinAutomatonBuilder::new(distance, transpositions))
            .collect();
        FuzzyBuilders { builders }
    }

    fn get(&self, max_edits: u8) -> &LevenshteinAutomatonBuilder {
        &self.builders[max_edits.min(MAX_EDIT_DISTANCE) as usize]
    }
}

/// Matcher for one normalized query token.
///
/// A term matches when it equals the token, starts with it, contains it
/// (tokens of at least `infix_min_len` chars), or when one of its prefixes
/// lies within the token's edit budget. The same matcher drives the
/// dictionary walk of a global search and the per-record re-scan of a
/// narrowed search, so both agree on membership.
pub struct TermMatcher {
    token: String,
    max_edits: u8,
    allow_infix: bool,
    dfa: DFA,
}

impl TermMatcher {
    pub fn new(token: &str, config: &SearchConfig, builders: &FuzzyBuilders) -> Self {
        let chars = token.chars().count();
        let max_edits = config.max_edits_for(chars);

        TermMatcher {
            token: token.to_string(),
            max_edits,
            allow_infix: chars >= config.infix_min_len,
            dfa: builders.get(max_edits).build_prefix_dfa(token),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn max_edits(&self) -> u8 {
        self.max_edits
    }

    pub fn allows_infix(&self) -> bool {
        self.allow_infix
    }

    pub fn classify(&self, term: &str) -> Option<MatchKind> {
        if term == self.token {
            return Some(MatchKind::Exact);
        }
        if term.starts_with(self.token.as_str()) {
            return Some(MatchKind::Prefix);
        }
        if self.allow_infix && term.contains(self.token.as_str()) {
            return Some(MatchKind::Infix);
        }
        if self.max_edits == 0 {
            return None;
        }

        match self.prefix_distance(term)? {
            0 => Some(MatchKind::Prefix),
            edits => Some(MatchKind::Fuzzy(edits)),
        }
    }

    /// Edit distance between the token and the closest prefix of `term`
    fn prefix_distance(&self, term: &str) -> Option<u8> {
        let mut state = self.dfa.initial_state();

        for &byte in term.as_bytes() {
            state = self.dfa.transition(state, byte);
            if state == SINK_STATE {
                return None;
            }
        }

        match self.dfa.distance(state) {
            Distance::Exact(d) if d <= self.max_edits => Some(d),
            _ => None,
        }
    }

    /// Automaton view for walking an FST term dictionary
    pub fn automaton(&self) -> DfaAutomaton<'_> {
        DfaAutomaton(&self.dfa)
    }
}

/// Adapts a Levenshtein DFA to `fst::Automaton`
pub struct DfaAutomaton<'a>(&'a DFA);

impl Automaton for DfaAutomaton<'_> {
    type State = u32;

    fn start(&self) -> u32 {
        self.0.initial_state()
    }

    fn is_match(&self, state: &u32) -> bool {
        matches!(self.0.distance(*state), Distance::Exact(_))
    }

    fn can_match(&self, state: &u32) -> bool {
        *state != SINK_STATE
    }

    fn accept(&self, state: &u32, byte: u8) -> u32 {
        self.0.transition(*state, byte)
    }
}
