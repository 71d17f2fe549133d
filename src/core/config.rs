use std::path::PathBuf;
use std::time::Duration;

/// Key of the durable collection blob.
pub const DEFAULT_STORAGE_KEY: &str = "mop-mounts.v2.owned";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub dataset_path: PathBuf,       // mounts.json (array of records)
    pub dataset_meta_path: PathBuf,  // dataset.meta.json (optional)
    pub storage_dir: PathBuf,        // FileStorage root
    pub storage_key: String,

    pub search: SearchConfig,

    /// Quiescence window applied by callers that debounce keystrokes
    pub debounce_ms: u64,
}

impl CatalogConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            dataset_path: PathBuf::from("./data/mounts.json"),
            dataset_meta_path: PathBuf::from("./data/dataset.meta.json"),
            storage_dir: PathBuf::from("./data/user"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            search: SearchConfig::default(),
            debounce_ms: 150,
        }
    }
}

/// Fuzzy matching parameters shared by global and narrowed search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub one_edit_min_len: usize,   // query tokens this long tolerate 1 typo
    pub two_edit_min_len: usize,   // ... and this long tolerate 2
    pub infix_min_len: usize,      // shortest token matched inside a word
    pub transpositions: bool,      // "teh" -> "the" costs one edit
    pub query_cache_size: usize,   // 0 disables the cache
}

impl SearchConfig {
    pub fn max_edits_for(&self, token_chars: usize) -> u8 {
        if token_chars >= self.two_edit_min_len {
            2
        } else if token_chars >= self.one_edit_min_len {
            1
        } else {
            0
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            one_edit_min_len: 4,
            two_edit_min_len: 8,
            infix_min_len: 2,
            transpositions: true,
            query_cache_size: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_budget_grows_with_token_length() {
        let config = SearchConfig::default();
        assert_eq!(config.max_edits_for(3), 0);
        assert_eq!(config.max_edits_for(4), 1);
        assert_eq!(config.max_edits_for(7), 1);
        assert_eq!(config.max_edits_for(8), 2);
    }
}
