use std::sync::Arc;
use parking_lot::RwLock;
use tracing::info;
use crate::collection::store::CollectionStore;
use crate::core::config::CatalogConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::loader::DatasetLoader;
use crate::core::types::DatasetSnapshot;
use crate::index::builder::{IndexBuilder, SearchIndex};
use crate::query::engine::QueryEngine;
use crate::storage::backend::StorageBackend;

/// Session context holding the current dataset and its indexes.
///
/// A new snapshot is indexed completely before it replaces the old one,
/// so readers only ever see a fully built index.
pub struct Catalog {
    config: CatalogConfig,
    current: RwLock<Option<Arc<SearchIndex>>>,
}

impl Catalog {
    pub fn new(config: CatalogConfig) -> Self {
        Catalog {
            config,
            current: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Index `snapshot` and make it current
    pub fn install(&self, snapshot: DatasetSnapshot) -> Result<Arc<SearchIndex>> {
        self.install_shared(Arc::new(snapshot))
    }

    pub fn install_shared(&self, snapshot: Arc<DatasetSnapshot>) -> Result<Arc<SearchIndex>> {
        let index = Arc::new(IndexBuilder::new(self.config.search.clone()).build(snapshot)?);

        let previous = self.current.write().replace(Arc::clone(&index));
        info!(
            target: "mountdex::catalog",
            data_version = index.data_version(),
            previous_version = previous.as_ref().map(|p| p.data_version()),
            "Dataset installed"
        );
        Ok(index)
    }

    /// Install and then drop owned ids the new dataset no longer has.
    /// Returns the removed ids.
    pub fn install_and_reconcile<S: StorageBackend>(
        &self,
        snapshot: DatasetSnapshot,
        store: &mut CollectionStore<S>,
    ) -> Result<Vec<String>> {
        let index = self.install(snapshot)?;
        let snapshot = index.snapshot();
        Ok(store.reconcile_with_version(&snapshot.valid_ids(), snapshot.data_version))
    }

    /// Read the dataset through `loader` and install it
    pub async fn load_from(&self, loader: &DatasetLoader) -> Result<Arc<SearchIndex>> {
        let snapshot = loader.load().await?;
        self.install_shared(snapshot)
    }

    /// Engine over the current index; fails until a dataset is installed
    pub fn engine(&self) -> Result<QueryEngine> {
        self.current
            .read()
            .as_ref()
            .map(|index| QueryEngine::new(Arc::clone(index)))
            .ok_or_else(|| Error::new(ErrorKind::InvalidState, "dataset not loaded"))
    }

    pub fn snapshot(&self) -> Option<Arc<DatasetSnapshot>> {
        self.current.read().as_ref().map(|index| Arc::clone(index.snapshot()))
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Drop the current dataset and indexes
    pub fn reset(&self) {
        self.current.write().take();
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}
