//! Error types for layout generation

use thiserror::Error;

/// Errors raised while building palettes or generating layouts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("invalid layout parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Result type alias for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
