//! Error types for framepacer

use thiserror::Error;

/// Result type alias for framepacer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for framepacer
#[derive(Debug, Error)]
pub enum Error {
    /// Session configuration rejected before startup
    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    /// A frame or audio source ran dry with no padding/looping policy
    #[error("Source exhausted")]
    SourceExhausted,

    /// A unit violated the pipeline invariants (wrong slice length or
    /// non-contiguous sequence). Fatal: the anti-drift guarantee is
    /// already broken when this is observed.
    #[error("Malformed unit: sequence {sequence} (expected {expected}): {detail}")]
    MalformedUnit {
        /// Sequence number carried by the offending unit
        sequence: u64,
        /// Sequence number the observer expected next
        expected: u64,
        /// Which invariant was violated
        detail: String,
    },

    /// A pipeline stage hung up before propagating end-of-stream
    #[error("Pipeline channel closed: {0}")]
    ChannelClosed(&'static str),

    /// A worker task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Task(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV decode error
    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
