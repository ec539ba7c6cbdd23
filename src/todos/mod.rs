//! Todo entity and input rules.

pub mod model;

pub use model::{Todo, like_matcher, like_pattern, validate_text};
