//! Error types

use thiserror::Error;

/// Errors surfaced by a conversion.
///
/// Everything else (bad URLs, unresolved `itemref` ids, unparsable numbers
/// or dates) degrades to an empty or untyped value instead.
#[derive(Debug, Error)]
pub enum Error {
    /// An item was reached again from inside its own expansion (strict mode only)
    #[error("cyclic structure: item {subject} is reachable from itself")]
    CyclicStructure { subject: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
