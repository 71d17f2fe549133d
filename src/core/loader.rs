use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::core::config::CatalogConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DatasetSnapshot, Record};

const ID_PATTERN: &str = "^[a-z0-9-]+$";

/// Contents of `dataset.meta.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMeta {
    pub data_version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at_utc: Option<DateTime<Utc>>,
}

/// Decode a record array and optional meta document into a snapshot.
/// Malformed or duplicate ids are reported, never rejected.
pub fn parse_snapshot(records_json: &str, meta_json: Option<&str>) -> Result<DatasetSnapshot> {
    let records: Vec<Record> = serde_json::from_str(records_json)
        .map_err(|e| Error::load(format!("Invalid dataset: {}", e)))?;

    let meta = meta_json
        .map(|text| serde_json::from_str::<DatasetMeta>(text))
        .transpose()
        .map_err(|e| Error::load(format!("Invalid dataset metadata: {}", e)))?;

    report_id_problems(&records)?;

    Ok(match meta {
        Some(meta) => DatasetSnapshot::new(meta.data_version, records),
        None => DatasetSnapshot::from_records(records),
    })
}

fn report_id_problems(records: &[Record]) -> Result<()> {
    let pattern = Regex::new(ID_PATTERN)
        .map_err(|e| Error::new(ErrorKind::Internal, e.to_string()))?;

    let malformed = records.iter().filter(|r| !pattern.is_match(&r.id)).count();
    let mut seen = HashSet::with_capacity(records.len());
    let duplicates = records.iter().filter(|r| !seen.insert(r.id.as_str())).count();

    if malformed > 0 {
        warn!(target: "mountdex::loader", malformed, pattern = ID_PATTERN, "Dataset contains malformed ids");
    }
    if duplicates > 0 {
        warn!(target: "mountdex::loader", duplicates, "Dataset contains duplicate ids, last one wins");
    }
    Ok(())
}

/// Reads the dataset from local files and keeps the last snapshot it read
pub struct DatasetLoader {
    dataset_path: PathBuf,
    meta_path: PathBuf,
    cache: Mutex<Option<Arc<DatasetSnapshot>>>,
}

impl DatasetLoader {
    pub fn new(config: &CatalogConfig) -> Self {
        DatasetLoader {
            dataset_path: config.dataset_path.clone(),
            meta_path: config.dataset_meta_path.clone(),
            cache: Mutex::new(None),
        }
    }

    /// Cached snapshot if any, otherwise read both files.
    /// Overlapping loads may both read; the last to finish is cached.
    pub async fn load(&self) -> Result<Arc<DatasetSnapshot>> {
        let cached = self.cache.lock().clone();
        if let Some(cached) = cached {
            debug!(target: "mountdex::loader", "Reusing cached dataset");
            return Ok(cached);
        }

        let records_json = tokio::fs::read_to_string(&self.dataset_path)
            .await
            .map_err(|e| Error::load(format!("Failed to read {}: {}", self.dataset_path.display(), e)))?;

        let meta_json = match tokio::fs::read_to_string(&self.meta_path).await {
            Ok(text) => Some(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(Error::load(format!("Failed to read {}: {}", self.meta_path.display(), err)));
            }
        };

        let snapshot = Arc::new(parse_snapshot(&records_json, meta_json.as_deref())?);
        info!(
            target: "mountdex::loader",
            records = snapshot.len(),
            data_version = snapshot.data_version,
            "Dataset loaded"
        );

        *self.cache.lock() = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Forget the cached snapshot so the next `load` reads again
    pub fn invalidate(&self) {
        self.cache.lock().take();
    }

    pub fn is_cached(&self) -> bool {
        self.cache.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDS: &str = r#"[
        {"id":"red-drake","name":"Red Drake","expansion":"Wrath of the Lich King","category":"Flying",
         "faction":"Neutral","sourceType":"Vendor","sourceDetail":"Wyrmrest Accord",
         "dataVersion":2,"lastUpdatedUtc":"2024-03-01T00:00:00Z"},
        {"id":"Bad_Id","name":"Odd","expansion":"Classic","category":"Ground",
         "faction":"Horde","sourceType":"Other","sourceDetail":"?","tags":["odd"],
         "dataVersion":5,"lastUpdatedUtc":"2024-03-01T00:00:00Z"}
    ]"#;

    #[test]
    fn version_comes_from_meta_or_records() {
        let snapshot = parse_snapshot(RECORDS, None).unwrap();
        assert_eq!(snapshot.data_version, 5);
        assert_eq!(snapshot.len(), 2);

        let meta = r#"{"dataVersion":11,"generatedAtUtc":"2024-03-02T00:00:00Z"}"#;
        assert_eq!(parse_snapshot(RECORDS, Some(meta)).unwrap().data_version, 11);
        assert_eq!(parse_snapshot("[]", None).unwrap().data_version, 0);
    }

    #[test]
    fn bad_json_is_a_load_error() {
        assert_eq!(parse_snapshot("{", None).unwrap_err().kind, ErrorKind::Load);
        assert_eq!(parse_snapshot("[]", Some("nope")).unwrap_err().kind, ErrorKind::Load);
        let unknown_enum = r#"[{"id":"x","name":"x","expansion":"Legion","category":"Flying",
            "faction":"Neutral","sourceType":"Drop","sourceDetail":"","dataVersion":1,
            "lastUpdatedUtc":"2024-03-01T00:00:00Z"}]"#;
        assert!(parse_snapshot(unknown_enum, None).is_err());
    }

    #[tokio::test]
    async fn load_caches_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let config = CatalogConfig {
            dataset_path: dir.path().join("mounts.json"),
            dataset_meta_path: dir.path().join("dataset.meta.json"),
            ..CatalogConfig::default()
        };
        tokio::fs::write(&config.dataset_path, RECORDS).await.unwrap();

        let loader = DatasetLoader::new(&config);
        let first = loader.load().await.unwrap();
        assert_eq!(first.data_version, 5);

        tokio::fs::write(&config.dataset_path, "[]").await.unwrap();
        let second = loader.load().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        loader.invalidate();
        assert!(!loader.is_cached());
        assert!(loader.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_dataset_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = CatalogConfig {
            dataset_path: dir.path().join("absent.json"),
            ..CatalogConfig::default()
        };
        let err = DatasetLoader::new(&config).load().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Load);
    }
}
