/*!
 * Error types for the textai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::app_config::ProviderKind;

/// Maximum number of body characters shown when a backend error is displayed
pub const BODY_SNIPPET_CHARS: usize = 500;

/// Why a single HTTP exchange did not produce a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The caller cancelled the call before a response arrived
    #[error("request was cancelled")]
    Canceled,

    /// The call deadline elapsed before a response arrived
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// The connection could not be established or was dropped
    #[error("connection failed: {0}")]
    Connection(String),

    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportFailure {
    /// True when the failure came from the caller's context rather than the network
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::DeadlineExceeded)
    }
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A hosted backend was constructed without its API key
    #[error("{provider}: missing API key, set the {env_var} environment variable")]
    MissingCredential {
        /// Backend that needed the key
        provider: ProviderKind,
        /// Environment variable the key is read from
        env_var: &'static str,
    },

    /// The backend could not be reached
    #[error("{provider}: transport failure: {cause}")]
    TransportFailure {
        /// Backend that was called
        provider: ProviderKind,
        /// Underlying cause
        cause: TransportFailure,
    },

    /// Error returned by the API itself
    #[error("{provider}: API responded with error: {status} - {}", snippet(.body))]
    BackendError {
        /// Backend that responded
        provider: ProviderKind,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The response body did not match the expected envelope
    #[error("{provider}: failed to decode API response: {message}")]
    DecodeFailure {
        /// Backend that responded
        provider: ProviderKind,
        /// Decoder message
        message: String,
    },

    /// The envelope was valid but carried no answer
    #[error("{provider}: API response contained no result")]
    EmptyResult {
        /// Backend that responded
        provider: ProviderKind,
    },

    /// The outbound request could not be built
    #[error("{provider}: invalid request: {message}")]
    InvalidRequest {
        /// Backend the request was meant for
        provider: ProviderKind,
        /// What went wrong
        message: String,
    },
}

impl ProviderError {
    /// Backend this error belongs to
    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::MissingCredential { provider, .. }
            | Self::TransportFailure { provider, .. }
            | Self::BackendError { provider, .. }
            | Self::DecodeFailure { provider, .. }
            | Self::EmptyResult { provider }
            | Self::InvalidRequest { provider, .. } => *provider,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BackendError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Truncate a response body for display
pub fn snippet(body: &str) -> String {
    if body.chars().count() > BODY_SNIPPET_CHARS {
        let head: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// No text was supplied by any input source
    #[error("missing input: pass --input, --file or pipe text on stdin")]
    MissingInput,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Input exceeded the configured size limit
    #[error("{origin} too large (limit {limit_kb}KB)")]
    InputTooLarge {
        /// Where the input came from
        origin: String,
        /// Configured limit
        limit_kb: usize,
    },

    /// Input looked like a binary file
    #[error("incorrect file type: {0} contains NUL bytes")]
    BinaryInput(String),

    /// Error from a provider
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Clipboard access failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

// Utility functions for error conversion
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Config(error.to_string())
    }
}
