pub mod debounce;
pub mod fuzzy;
pub mod results;
