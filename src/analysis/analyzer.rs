use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::diacritics::{strip_diacritics, DiacriticFilter};
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};

/// Text analysis pipeline
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Stage names joined in order, e.g. "standard>lowercase>diacritics"
    pub fn pipeline(&self) -> String {
        std::iter::once(self.tokenizer.name())
            .chain(self.filters.iter().map(|f| f.name()))
            .collect::<Vec<_>>()
            .join(">")
    }

    /// Folded term texts, in order, duplicates kept
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.analyze(text).into_iter().map(|t| t.text).collect()
    }

    /// Case- and accent-insensitive analyzer used for both records and queries.
    /// Lowercasing runs first so that decomposed lowercase forms lose their marks too.
    pub fn catalog() -> Self {
        Analyzer::new("catalog".to_string(),
                      Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(DiacriticFilter))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::catalog()
    }
}

/// Whole-string folding: lowercase, strip diacritics, trim
pub fn normalize_text(text: &str) -> String {
    strip_diacritics(&text.to_lowercase()).trim().to_string()
}
