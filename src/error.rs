//! Error types for pattern-scout.
//!
//! Almost everything in the engine recovers locally: per-element analysis
//! failures skip the element, missing pattern libraries fall back to dynamic
//! discovery, and persistence failures degrade to "no learned patterns".
//! The variants here cover the few conditions worth surfacing to a caller.

/// Error type for detection and correction-store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Correction persistence backend failed to read or write.
    #[error("storage backend error: {0}")]
    Storage(String),

    /// A supplied pattern library could not be parsed.
    #[error("invalid pattern library: {0}")]
    InvalidPatternLibrary(String),
}

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, Error>;
