pub mod core;
pub mod storage;
pub mod analysis;
pub mod schema;
pub mod index;
pub mod scoring;
pub mod search;
pub mod query;
pub mod collection;

pub use crate::collection::{CollectionFile, CollectionStore, ImportOutcome};
pub use crate::core::catalog::Catalog;
pub use crate::core::config::{CatalogConfig, SearchConfig};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{DatasetSnapshot, Expansion, Faction, MountCategory, Record, Selection, SourceType};
pub use crate::query::engine::QueryEngine;
pub use crate::query::types::{CatalogQuery, OwnershipFilter, OwnershipLookup};

/*
┌──────────────────────────────────────────────────────────────────────────────────┐
│                             MOUNTDEX ARCHITECTURE                                │
└──────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── DATASET LAYER ───────────────────────────────────┐
│                                                                                  │
│  ┌────────────────────────┐      ┌──────────────────────────────────────────┐    │
│  │ struct DatasetLoader   │      │ struct Catalog                           │    │
│  │ • dataset_path         │ ───► │ • config: CatalogConfig                  │    │
│  │ • meta_path            │      │ • current: RwLock<Option<Arc<Index>>>    │    │
│  │ • cache: Mutex<Option< │      │   install() builds, then swaps the Arc   │    │
│  │   Arc<DatasetSnapshot>>│      │   engine() -> QueryEngine                │    │
│  └────────────────────────┘      └──────────────────────────────────────────┘    │
│                                                                                  │
│  ┌────────────────────────┐      ┌──────────────────────────────────────────┐    │
│  │ struct DatasetSnapshot │      │ struct Record                            │    │
│  │ • data_version: u64    │      │ • id, name, source_detail                │    │
│  │ • records: Vec<Record> │      │ • expansion / category / faction /       │    │
│  └────────────────────────┘      │   source_type (closed enums)             │    │
│                                  │ • zone, tags, ... : Option<_>            │    │
│                                  └──────────────────────────────────────────┘    │
└──────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── INDEX LAYER ─────────────────────────────────────┐
│                                                                                  │
│  ┌──────────────────────────────────────────────────────────────────────────┐    │
│  │ struct SearchIndex                                                       │    │
│  │ • snapshot: Arc<DatasetSnapshot>                                         │    │
│  │ • text: TextIndex        fst::Set dictionary + postings + forward index  │    │
│  │ • buckets: BucketIndex   Expansion -> ordinals (snapshot order)          │    │
│  │ • identity: IdentityIndex  id -> ordinal (last write wins)               │    │
│  │ • cache: QueryCache      LRU of global search hits                       │    │
│  └──────────────────────────────────────────────────────────────────────────┘    │
│                                                                                  │
│  Analyzer: StandardTokenizer -> LowercaseFilter -> DiacriticFilter               │
│  TermMatcher: exact | prefix | infix | Levenshtein DFA (0/1/2 edits)             │
│  Score: Σ tokens max(field weight × closeness)                                   │
└──────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── QUERY LAYER ─────────────────────────────────────┐
│                                                                                  │
│  QueryEngine::combined(CatalogQuery, &dyn OwnershipLookup)                       │
│    classifications (bucket union) -> facets -> ownership -> text re-scan         │
│                                                                                  │
│  Debouncer<T>: one pending tokio timer, re-armed on every schedule()             │
└──────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── COLLECTION LAYER ────────────────────────────────┐
│                                                                                  │
│  ┌────────────────────────────┐     ┌───────────────────────────────────────┐    │
│  │ struct CollectionStore<S>  │     │ trait StorageBackend                  │    │
│  │ • storage: S               │ ──► │ • MemoryStorage (tests)               │    │
│  │ • state: CollectionState   │     │ • FileStorage (tempfile + persist)    │    │
│  │   toggle / set_bulk /      │     └───────────────────────────────────────┘    │
│  │   reconcile / stats        │                                                  │
│  └────────────────────────────┘     CollectionFile  schema v1, sorted owned      │
│                                     export() / import() replace semantics        │
└──────────────────────────────────────────────────────────────────────────────────┘
*/
