//! Output rendering for structured page results.

mod json;

pub use json::{to_json, JsonFormat};
