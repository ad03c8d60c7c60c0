//! Shapes for recorded sample-store traffic.

pub mod sanitizer;
pub mod types;

pub use sanitizer::{Sanitizer, SENSITIVE_HEADERS};
pub use types::*;
