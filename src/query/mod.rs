pub mod cache;
pub mod engine;
pub mod summary;
pub mod types;
