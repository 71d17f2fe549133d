use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, error, info, warn};
use crate::collection::state::CollectionState;
use crate::core::error::{Error, Result};
use crate::core::stats::{CollectionStats, ProgressStats};
use crate::core::types::Record;
use crate::query::types::OwnershipLookup;
use crate::storage::backend::StorageBackend;

/// Owned set captured for a later `restore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedSnapshot(BTreeSet<String>);

impl OwnedSnapshot {
    pub fn ids(&self) -> &BTreeSet<String> {
        &self.0
    }
}

/// The user's ownership collection, persisted under one storage key.
///
/// Every mutation writes the whole blob once. A failed write is logged and
/// remembered but never rolls back the in-memory state.
pub struct CollectionStore<S: StorageBackend> {
    storage: S,
    key: String,
    state: CollectionState,
    last_storage_error: Option<Error>,
}

impl<S: StorageBackend> CollectionStore<S> {
    pub fn open(storage: S, key: &str) -> Self {
        let state = match storage.read(key) {
            Ok(Some(blob)) => CollectionState::from_blob(&blob).unwrap_or_else(|err| {
                warn!(
                    target: "mountdex::collection",
                    key,
                    error = %err,
                    "Stored collection unreadable, starting empty"
                );
                CollectionState::empty()
            }),
            Ok(None) => CollectionState::empty(),
            Err(err) => {
                warn!(
                    target: "mountdex::collection",
                    key,
                    backend = storage.name(),
                    error = %err,
                    "Stored collection could not be read, starting empty"
                );
                CollectionState::empty()
            }
        };

        debug!(target: "mountdex::collection", key, owned = state.owned_ids.len(), "Collection opened");

        CollectionStore {
            storage,
            key: key.to_string(),
            state,
            last_storage_error: None,
        }
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    pub fn owned_ids(&self) -> &BTreeSet<String> {
        &self.state.owned_ids
    }

    pub fn owned_count(&self) -> usize {
        self.state.owned_ids.len()
    }

    pub fn is_owned(&self, id: &str) -> bool {
        self.state.owned_ids.contains(id)
    }

    pub fn dataset_version(&self) -> Option<u64> {
        self.state.dataset_version
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn last_storage_error(&self) -> Option<&Error> {
        self.last_storage_error.as_ref()
    }

    /// Flip ownership of `id` and return the new state
    pub fn toggle(&mut self, id: &str) -> bool {
        let owned = if self.state.owned_ids.remove(id) {
            false
        } else {
            self.state.owned_ids.insert(id.to_string());
            true
        };
        self.commit();
        owned
    }

    /// Mark every id as owned or not owned with a single write.
    /// Returns how many ids actually changed.
    pub fn set_bulk<I, T>(&mut self, ids: I, owned: bool) -> usize
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut changed = 0;
        for id in ids {
            let id = id.as_ref();
            let flipped = if owned {
                self.state.owned_ids.insert(id.to_string())
            } else {
                self.state.owned_ids.remove(id)
            };
            if flipped {
                changed += 1;
            }
        }

        if changed > 0 {
            self.commit();
        }
        changed
    }

    /// Drop owned ids (and notes) that are not in `valid_ids`.
    /// Returns the removed owned ids; writes only when something changed.
    pub fn reconcile(&mut self, valid_ids: &HashSet<&str>) -> Vec<String> {
        self.reconcile_inner(valid_ids, None)
    }

    /// `reconcile` that also stamps the dataset version, still with at most
    /// one write. A version change alone is kept in memory and goes out with
    /// the next write.
    pub fn reconcile_with_version(&mut self, valid_ids: &HashSet<&str>, data_version: u64) -> Vec<String> {
        self.reconcile_inner(valid_ids, Some(data_version))
    }

    fn reconcile_inner(&mut self, valid_ids: &HashSet<&str>, data_version: Option<u64>) -> Vec<String> {
        if data_version.is_some() {
            self.state.dataset_version = data_version;
        }

        let removed: Vec<String> = self
            .state
            .owned_ids
            .iter()
            .filter(|id| !valid_ids.contains(id.as_str()))
            .cloned()
            .collect();

        let notes_before = self.state.notes.len();
        self.state.notes.retain(|id, _| valid_ids.contains(id.as_str()));
        let notes_dropped = notes_before - self.state.notes.len();

        if removed.is_empty() && notes_dropped == 0 {
            return removed;
        }

        for id in &removed {
            self.state.owned_ids.remove(id);
        }

        info!(
            target: "mountdex::collection",
            removed = removed.len(),
            notes_dropped,
            data_version = ?self.state.dataset_version,
            "Collection reconciled against dataset"
        );
        self.commit();
        removed
    }

    /// Progress over `records`; only owned ids present in `records` count
    pub fn stats(&self, records: &[Record]) -> CollectionStats {
        let mut counts: BTreeMap<_, (usize, usize)> = BTreeMap::new();
        let mut owned_total = 0;

        for record in records {
            let owned = self.is_owned(&record.id);
            let entry = counts.entry(record.classification()).or_insert((0, 0));
            entry.0 += 1;
            if owned {
                entry.1 += 1;
                owned_total += 1;
            }
        }

        CollectionStats {
            global: ProgressStats::new(records.len(), owned_total),
            by_classification: counts
                .into_iter()
                .map(|(classification, (total, owned))| (classification, ProgressStats::new(total, owned)))
                .collect(),
        }
    }

    pub fn snapshot(&self) -> OwnedSnapshot {
        OwnedSnapshot(self.state.owned_ids.clone())
    }

    /// Put back a previously captured owned set with one write
    pub fn restore(&mut self, snapshot: OwnedSnapshot) {
        if snapshot.0 == self.state.owned_ids {
            return;
        }
        self.state.owned_ids = snapshot.0;
        self.commit();
    }

    pub fn note(&self, id: &str) -> Option<&str> {
        self.state.notes.get(id).map(String::as_str)
    }

    /// `None` or a blank note removes it
    pub fn set_note(&mut self, id: &str, note: Option<String>) {
        let changed = match note.filter(|n| !n.trim().is_empty()) {
            Some(note) => self.state.notes.insert(id.to_string(), note.clone()).as_ref() != Some(&note),
            None => self.state.notes.remove(id).is_some(),
        };
        if changed {
            self.commit();
        }
    }

    pub fn notes(&self) -> &BTreeMap<String, String> {
        &self.state.notes
    }

    /// Replace the owned set and notes wholesale with one write
    pub fn replace_all(&mut self, owned_ids: BTreeSet<String>, notes: BTreeMap<String, String>) {
        self.state.owned_ids = owned_ids;
        self.state.notes = notes;
        self.commit();
    }

    fn commit(&mut self) {
        self.state.touch();
        match self.persist() {
            Ok(()) => self.last_storage_error = None,
            Err(err) => {
                error!(
                    target: "mountdex::collection",
                    key = %self.key,
                    backend = self.storage.name(),
                    error = %err,
                    "Failed to persist collection"
                );
                self.last_storage_error = Some(err);
            }
        }
    }

    fn persist(&mut self) -> Result<()> {
        let blob = self.state.to_blob()?;
        self.storage
            .write(&self.key, &blob)
            .map_err(|err| Error::storage(err.context))
    }
}

impl<S: StorageBackend> OwnershipLookup for CollectionStore<S> {
    fn is_owned(&self, id: &str) -> bool {
        CollectionStore::is_owned(self, id)
    }
}
