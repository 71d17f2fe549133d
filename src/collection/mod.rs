pub mod state;
pub mod store;
pub mod transfer;

pub use state::CollectionState;
pub use store::{CollectionStore, OwnedSnapshot};
pub use transfer::{CollectionFile, ImportOutcome};
