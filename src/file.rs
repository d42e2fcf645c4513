//! YAML load and save for layouts.
//!
//! Loading normalizes the layout id: a canonical UUID is kept verbatim, any
//! other value is replaced with a fresh one. Everything else round-trips, so
//! `from_yaml(&to_yaml(&layout)?)? == layout` for any layout with a valid id.

#[cfg(test)]
#[path = "file_test.rs"]
mod file_test;

use crate::consts::LAYOUT_FORMAT_VERSION;
use crate::error::ErrorCode;
use crate::identity;
use crate::layout::Layout;

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("failed to parse layout: {0}")]
    Parse(#[source] serde_yaml::Error),
    #[error("failed to serialize layout: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

impl ErrorCode for FileError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_LAYOUT_PARSE",
            Self::Serialize(_) => "E_LAYOUT_SERIALIZE",
        }
    }

    fn retryable(&self) -> bool {
        false
    }
}

/// Serialize a layout to YAML text.
///
/// # Errors
///
/// `Serialize` if a value cannot be represented (e.g. a non-finite height).
pub fn to_yaml(layout: &Layout) -> Result<String, FileError> {
    serde_yaml::to_string(layout).map_err(FileError::Serialize)
}

/// Parse YAML text into a layout with a valid id.
///
/// # Errors
///
/// `Parse` on malformed YAML or a document that is not a layout.
pub fn from_yaml(text: &str) -> Result<Layout, FileError> {
    let mut layout: Layout = serde_yaml::from_str(text).map_err(FileError::Parse)?;
    if layout.version != LAYOUT_FORMAT_VERSION {
        tracing::warn!(version = %layout.version, expected = LAYOUT_FORMAT_VERSION, "layout format version differs");
    }
    let external = (!layout.id.is_empty()).then_some(layout.id.as_str());
    layout.id = identity::resolve_layout_id(external);
    Ok(layout)
}
