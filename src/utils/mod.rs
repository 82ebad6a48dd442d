//! Small shared helpers

pub mod string;

pub use string::{clamp_chars, collapse_whitespace, normalize_key};
