use std::io;

use thiserror::Error;

/// Errors raised while turning one layout document into lines.
///
/// All of them are local to a single document (or a single detection inside
/// it); the batch driver logs them and moves on.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("document has no text region")]
    NoRegionFound,

    #[error("malformed coordinate {token:?}: {reason}")]
    MalformedCoordinate { token: String, reason: String },

    #[error("text line {index} has no baseline")]
    MissingBaseline { index: usize },

    #[error("text count mismatch: {lines} line(s), {texts} text(s)")]
    TextCountMismatch { lines: usize, texts: usize },

    #[error("invalid layout config: {0}")]
    InvalidConfig(String),

    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl LayoutError {
    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        LayoutError::MalformedCoordinate {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
