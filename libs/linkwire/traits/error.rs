use thiserror::Error;

/// Main error type for linkwire
#[derive(Error, Debug)]
pub enum LinkError {
    /// A required argument was missing or empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested capability is not offered by this transport
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Operation invoked in the wrong connection state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Socket-level failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Message could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Inbound frame exceeded the configured limit
    #[error("Frame too large: {size} bytes (limit {limit})")]
    FrameTooLarge { size: usize, limit: usize },

    /// Channel send error
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::Codec(err.to_string())
    }
}

/// Result type for linkwire operations
pub type Result<T> = std::result::Result<T, LinkError>;
