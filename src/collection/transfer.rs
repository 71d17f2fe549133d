use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;
use crate::collection::store::CollectionStore;
use crate::core::error::{Error, Result};
use crate::storage::backend::StorageBackend;

pub const COLLECTION_SCHEMA: &str = "mop-mounts.user-collection";
pub const COLLECTION_SCHEMA_VERSION: u64 = 1;
pub const DEFAULT_EXPORT_FILE_NAME: &str = "mop-mounts.collection.json";

/// Portable collection file exchanged between installs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFile {
    pub schema: String,
    pub schema_version: u64,
    pub exported_at_utc: DateTime<Utc>,
    pub dataset_data_version: u64,
    pub owned: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: BTreeMap<String, String>,
}

/// `"notes": null` reads the same as a missing field
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CollectionFile {
    pub fn from_state(owned: &BTreeSet<String>, notes: &BTreeMap<String, String>, dataset_version: u64) -> Self {
        Self::from_state_at(owned, notes, dataset_version, Utc::now())
    }

    pub fn from_state_at(
        owned: &BTreeSet<String>,
        notes: &BTreeMap<String, String>,
        dataset_version: u64,
        exported_at: DateTime<Utc>,
    ) -> Self {
        CollectionFile {
            schema: COLLECTION_SCHEMA.to_string(),
            schema_version: COLLECTION_SCHEMA_VERSION,
            exported_at_utc: exported_at,
            dataset_data_version: dataset_version,
            // BTreeSet iteration is already ascending
            owned: owned.iter().cloned().collect(),
            notes: notes.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the schema tag, then the version, then decode the rest.
    /// Every failure is a `Format` error.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(text)
            .map_err(|e| Error::format(format!("Could not read collection file: {}", e)))?;

        if raw.get("schema").and_then(Value::as_str) != Some(COLLECTION_SCHEMA) {
            return Err(Error::format("Invalid file format. Expected mop-mounts collection file."));
        }

        let version = raw.get("schemaVersion").cloned().unwrap_or(Value::Null);
        if version.as_u64() != Some(COLLECTION_SCHEMA_VERSION) {
            return Err(Error::format(format!(
                "Unsupported schema version {}. Expected version {}.",
                version, COLLECTION_SCHEMA_VERSION
            )));
        }

        serde_json::from_value(raw)
            .map_err(|e| Error::format(format!("Malformed collection file: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema != COLLECTION_SCHEMA {
            return Err(Error::format("Invalid file format. Expected mop-mounts collection file."));
        }
        if self.schema_version != COLLECTION_SCHEMA_VERSION {
            return Err(Error::format(format!(
                "Unsupported schema version {}. Expected version {}.",
                self.schema_version, COLLECTION_SCHEMA_VERSION
            )));
        }
        Ok(())
    }
}

/// Result of an import: ids kept and ids unknown to the dataset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportOutcome {
    pub accepted_ids: Vec<String>,
    pub dropped_ids: Vec<String>,
}

pub fn export<S: StorageBackend>(store: &CollectionStore<S>, dataset_version: u64) -> CollectionFile {
    CollectionFile::from_state(store.owned_ids(), store.notes(), dataset_version)
}

/// Replace the store's contents with the file's owned ids that exist in
/// `valid_ids`. The store is untouched when the file is rejected.
pub fn import<S: StorageBackend>(
    store: &mut CollectionStore<S>,
    file: &CollectionFile,
    valid_ids: &HashSet<&str>,
) -> Result<ImportOutcome> {
    file.validate()?;

    let unique: BTreeSet<&str> = file.owned.iter().map(String::as_str).collect();
    let (accepted, dropped): (Vec<&str>, Vec<&str>) =
        unique.into_iter().partition(|id| valid_ids.contains(id));

    let notes: BTreeMap<String, String> = file
        .notes
        .iter()
        .filter(|(id, _)| valid_ids.contains(id.as_str()))
        .map(|(id, note)| (id.clone(), note.clone()))
        .collect();

    store.replace_all(accepted.iter().map(|id| id.to_string()).collect(), notes);

    info!(
        target: "mountdex::transfer",
        accepted = accepted.len(),
        dropped = dropped.len(),
        file_data_version = file.dataset_data_version,
        "Collection imported"
    );

    Ok(ImportOutcome {
        accepted_ids: accepted.into_iter().map(String::from).collect(),
        dropped_ids: dropped.into_iter().map(String::from).collect(),
    })
}

pub fn import_str<S: StorageBackend>(
    store: &mut CollectionStore<S>,
    text: &str,
    valid_ids: &HashSet<&str>,
) -> Result<ImportOutcome> {
    let file = CollectionFile::parse(text)?;
    import(store, &file, valid_ids)
}

pub async fn export_to_path<S: StorageBackend>(
    store: &CollectionStore<S>,
    dataset_version: u64,
    path: impl AsRef<Path>,
) -> Result<CollectionFile> {
    let file = export(store, dataset_version);
    tokio::fs::write(path.as_ref(), file.to_json_pretty()?).await?;
    info!(
        target: "mountdex::transfer",
        path = %path.as_ref().display(),
        owned = file.owned.len(),
        "Collection exported"
    );
    Ok(file)
}

pub async fn import_from_path<S: StorageBackend>(
    store: &mut CollectionStore<S>,
    path: impl AsRef<Path>,
    valid_ids: &HashSet<&str>,
) -> Result<ImportOutcome> {
    let text = tokio::fs::read_to_string(path.as_ref()).await?;
    import_str(store, &text, valid_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_STORAGE_KEY;
    use crate::core::error::ErrorKind;
    use crate::storage::memory::MemoryStorage;

    fn store_with(ids: &[&str]) -> CollectionStore<MemoryStorage> {
        let mut store = CollectionStore::open(MemoryStorage::new(), DEFAULT_STORAGE_KEY);
        store.set_bulk(ids.iter().copied(), true);
        store
    }

    #[test]
    fn export_sorts_owned_and_writes_notes() {
        let mut store = store_with(&["c", "a", "b"]);
        store.set_note("a", Some("first".to_string()));
        let file = export(&store, 5);
        assert_eq!(file.owned, vec!["a", "b", "c"]);
        assert_eq!(file.schema, COLLECTION_SCHEMA);
        assert_eq!(file.dataset_data_version, 5);

        let json = file.to_json_pretty().unwrap();
        assert!(json.contains("\"schemaVersion\": 1"));
        assert!(json.contains("\"notes\": {"));
    }

    #[test]
    fn export_is_deterministic_for_fixed_time() {
        let store = store_with(&["b", "a"]);
        let at = DateTime::<Utc>::UNIX_EPOCH;
        let first = CollectionFile::from_state_at(store.owned_ids(), store.notes(), 1, at);
        let second = CollectionFile::from_state_at(store.owned_ids(), store.notes(), 1, at);
        assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    }

    #[test]
    fn import_replaces_and_splits_unknown_ids() {
        let mut store = store_with(&["old"]);
        let valid: HashSet<&str> = HashSet::from(["a", "b", "old"]);
        let text = r#"{
            "schema": "mop-mounts.user-collection",
            "schemaVersion": 1,
            "exportedAtUtc": "2024-01-01T00:00:00Z",
            "datasetDataVersion": 2,
            "owned": ["b", "a", "ghost", "a"]
        }"#;

        let outcome = import_str(&mut store, text, &valid).unwrap();
        assert_eq!(outcome.accepted_ids, vec!["a", "b"]);
        assert_eq!(outcome.dropped_ids, vec!["ghost"]);
        assert!(!store.is_owned("old"));
        assert_eq!(store.owned_count(), 2);
    }

    #[test]
    fn wrong_schema_is_rejected_before_version() {
        let err = CollectionFile::parse(r#"{"schema":"something-else","schemaVersion":9}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
        assert_eq!(err.context, "Invalid file format. Expected mop-mounts collection file.");
    }

    #[test]
    fn future_version_is_rejected_even_with_new_shape() {
        let mut store = store_with(&["a"]);
        let text = r#"{"schema":"mop-mounts.user-collection","schemaVersion":2,"items":{}}"#;
        let err = import_str(&mut store, text, &HashSet::from(["a"])).unwrap_err();
        assert_eq!(err.context, "Unsupported schema version 2. Expected version 1.");
        assert!(store.is_owned("a"));
        assert_eq!(store.storage().write_count(), 1);
    }

    #[test]
    fn null_or_missing_notes_read_as_empty() {
        let head = r#""schema":"mop-mounts.user-collection","schemaVersion":1,"exportedAtUtc":"2024-01-01T00:00:00Z","datasetDataVersion":1,"owned":["a"]"#;
        for text in [format!("{{{},\"notes\":null}}", head), format!("{{{}}}", head)] {
            let file = CollectionFile::parse(&text).unwrap();
            assert!(file.notes.is_empty());
            assert_eq!(file.owned, vec!["a"]);
        }
    }

    #[test]
    fn unparsable_text_is_a_format_error() {
        let err = CollectionFile::parse("not json").unwrap_err();
        assert!(err.is_format());
    }

    #[tokio::test]
    async fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE_NAME);
        let source = store_with(&["a", "b"]);
        export_to_path(&source, 3, &path).await.unwrap();

        let mut target = store_with(&[]);
        let outcome = import_from_path(&mut target, &path, &HashSet::from(["a", "b", "c"]))
            .await
            .unwrap();
        assert_eq!(outcome.accepted_ids, vec!["a", "b"]);
        assert_eq!(target.owned_ids(), source.owned_ids());
    }
}
