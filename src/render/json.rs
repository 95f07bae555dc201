//! JSON rendering for structured page results.

use crate::error::{Error, Result};
use crate::model::PageResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a page result to JSON.
pub fn to_json(result: &PageResult, format: JsonFormat) -> Result<String> {
    let rendered = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };

    rendered.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
