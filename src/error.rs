//! Error types for `AppScout`
//!
//! This module defines all error types used throughout the crate,
//! providing clear error messages and proper error propagation.
//!
//! Error variants use `#[source]` to preserve error chains. None of these
//! errors is fatal to the application: the dashboard absorbs them and turns
//! them into advisory notices (see [`get_user_friendly_error`]).

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for `AppScout`
#[derive(Debug, Error)]
pub enum AppScoutError {
    /// Installed-app enumeration or native bridge failure
    #[error("Platform query failed: {0}")]
    PlatformQuery(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Transport-level failure talking to the remote service
    #[error("Network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The remote service answered, but not with success
    #[error("Remote service rejected the request (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the service
        status: u16,
        /// Message from the response body, or the status reason
        message: String,
    },

    /// No session token is stored
    #[error("No authentication token is stored")]
    AuthMissing,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Persisted key-value store error
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for `AppScout` operations
pub type Result<T> = std::result::Result<T, AppScoutError>;

/// Convert an error to the text of a user-visible alert
pub fn get_user_friendly_error(error: &AppScoutError) -> String {
    match error {
        AppScoutError::PlatformQuery(_) => "Could not read the list of installed apps.\n\n\
             Similar-app detection was skipped for this session."
            .to_string(),
        AppScoutError::Network(e) => format!("Failed to reach the server: {e}"),
        AppScoutError::Api { status, message } => {
            format!("The server rejected the request ({status}): {message}")
        }
        AppScoutError::AuthMissing => "You are not logged in.\n\n\
             Please log in to enable similar-app detection."
            .to_string(),
        AppScoutError::Config(_) => "Failed to load or save configuration.\n\n\
             Default settings will be used."
            .to_string(),
        AppScoutError::Storage(e) => format!("Failed to access local storage: {e}"),
        AppScoutError::Io(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        AppScoutError::Json(e) => format!("Received malformed data:\n\n{e}"),
    }
}
