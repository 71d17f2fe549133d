pub mod bucket;
pub mod builder;
pub mod identity;
pub mod text;
