pub mod diacritics;
pub mod lowercase;
