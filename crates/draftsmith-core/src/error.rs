//! Error types for the orchestration engine.

use thiserror::Error;

/// Comprehensive error type for all engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Transport-level failure talking to a remote service
    #[error("Transport error while {message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },
    /// A remote service answered with a non-success status code
    #[error("Request to {path} returned status {status}")]
    Status { status: u16, path: String },
    /// A command referenced a target that could not be resolved
    #[error("Command {index} is missing a target post: no identifier was produced by the previous command")]
    MissingTarget { index: usize },
    /// A command referenced a post absent from the discovery snapshot
    #[error("Post {id} not found in the discovery snapshot")]
    PostNotFound { id: u64 },
    /// The fuzzy patcher refused to mutate because no safe match exists
    #[error("Search text not found in post {id}; nothing was modified")]
    NoMatch { id: u64 },
    /// No session record exists for the given identifier
    #[error("Session {id} not found")]
    SessionNotFound { id: u64 },
    /// A session record's body could not be parsed on either path
    #[error("Failed to parse session record: {reason}")]
    SessionParse { reason: String },
    /// The plan generator returned something that is not a valid plan
    #[error("Invalid plan: {reason}")]
    InvalidPlan { reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl EngineError {
    /// Creates a configuration error from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a session parse error from a message.
    pub fn session_parse(reason: impl Into<String>) -> Self {
        Self::SessionParse {
            reason: reason.into(),
        }
    }
}

/// Extension trait mapping transport errors into
/// [`EngineError::Transport`] with a short description of the failed
/// call.
pub trait TransportResultExt<T> {
    /// Map a reqwest error with a message naming the operation.
    fn transport_context(self, message: &str) -> Result<T>;
}

impl<T> TransportResultExt<T> for std::result::Result<T, reqwest::Error> {
    fn transport_context(self, message: &str) -> Result<T> {
        self.map_err(|e| EngineError::Transport {
            message: message.to_string(),
            source: e,
        })
    }
}

/// Extension trait for configuration-related Results.
pub trait ConfigResultExt<T> {
    /// Map any error into a configuration error with a message.
    fn config_context(self, message: &str) -> Result<T>;
}

impl<T, E> ConfigResultExt<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn config_context(self, message: &str) -> Result<T> {
        self.map_err(|e| EngineError::Configuration {
            message: format!("{message}: {e}"),
        })
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
