use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

/// Strips accents: NFD decomposition, then combining marks are dropped.
/// "Zul'Aman Ámbar" folds to "Zul'Aman Ambar".
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

pub struct DiacriticFilter;

impl TokenFilter for DiacriticFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .filter_map(|mut token| {
                token.text = strip_diacritics(&token.text);
                // A token made only of marks folds to nothing
                if token.text.is_empty() { None } else { Some(token) }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "diacritics"
    }
}
