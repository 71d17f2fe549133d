pub mod backend;
pub mod file;
pub mod memory;

pub use backend::StorageBackend;
pub use file::FileStorage;
pub use memory::MemoryStorage;
