use std::collections::{BTreeMap, BTreeSet};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use crate::core::error::{Error, ErrorKind, Result};

/// In-memory ownership state of the local collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    pub owned_ids: BTreeSet<String>,
    pub last_updated: DateTime<Utc>,
    pub dataset_version: Option<u64>,
    pub notes: BTreeMap<String, String>,
}

impl CollectionState {
    pub fn empty() -> Self {
        CollectionState {
            owned_ids: BTreeSet::new(),
            last_updated: Utc::now(),
            dataset_version: None,
            notes: BTreeMap::new(),
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Decode a stored blob; accepts the current object form and the
    /// legacy bare array of ids.
    ///
    /// Only `ownedMountIds` is required. Missing or malformed metadata falls
    /// back to defaults and never costs the owned ids.
    pub fn from_blob(blob: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(blob)?;

        match raw {
            Value::Array(ids) => Ok(CollectionState {
                owned_ids: string_ids(&ids),
                ..CollectionState::empty()
            }),
            Value::Object(mut fields) => {
                let owned_ids = match fields.get("ownedMountIds") {
                    Some(Value::Array(ids)) => string_ids(ids),
                    _ => {
                        return Err(Error::new(
                            ErrorKind::Parse,
                            "stored collection has no ownedMountIds array",
                        ));
                    }
                };

                let last_updated = fields
                    .remove("lastUpdated")
                    .and_then(|value| serde_json::from_value(value).ok())
                    .unwrap_or_else(Utc::now);
                let notes = fields
                    .remove("notes")
                    .and_then(|value| serde_json::from_value(value).ok())
                    .unwrap_or_default();

                Ok(CollectionState {
                    owned_ids,
                    last_updated,
                    dataset_version: fields.get("dataVersion").and_then(Value::as_u64),
                    notes,
                })
            }
            _ => Err(Error::new(ErrorKind::Parse, "stored collection is neither an object nor an array")),
        }
    }

    pub fn to_blob(&self) -> Result<String> {
        let stored = StoredCollection {
            owned_mount_ids: self.owned_ids.iter().cloned().collect(),
            last_updated: self.last_updated,
            data_version: self.dataset_version,
            notes: if self.notes.is_empty() { None } else { Some(self.notes.clone()) },
        };
        Ok(serde_json::to_string(&stored)?)
    }
}

impl Default for CollectionState {
    fn default() -> Self {
        Self::empty()
    }
}

fn string_ids(values: &[Value]) -> BTreeSet<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Durable representation under the storage key
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredCollection {
    owned_mount_ids: Vec<String>,
    last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<BTreeMap<String, String>>,
}
