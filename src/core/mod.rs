pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod stats;
pub mod types;
