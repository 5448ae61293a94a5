use thiserror::Error;

/// Application-wide error types.
///
/// Every data source in the resolution chain reports failures through this enum.
/// Non-terminal sources never surface these to the caller: the resolver logs them
/// and moves on. Only the terminal static-file failure escapes, wrapped in
/// [`AppError::StaticFileFailed`].
///
/// # Error Conversion
///
/// Some errors convert from their source types using the `#[from]` attribute:
/// - `serde_json::Error` → `AppError::SerializationError`
/// - `std::io::Error` → `AppError::Io`
///
/// # Examples
///
/// ```
/// use folio_core::error::AppError;
///
/// let err = AppError::RemoteError {
///     status: 500,
///     status_text: "Internal Server Error".to_string(),
///     body: "boom".to_string(),
/// };
/// assert!(err.is_fallback_trigger());
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Identifying configuration is missing or invalid.
    ///
    /// Raised when the document store has neither a project id nor a database URL,
    /// or when a config file cannot be parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A source answered with a non-success HTTP status.
    ///
    /// The response body is captured for diagnostics even though the request failed.
    #[error("Remote fetch failed: {status} {status_text} {body}")]
    RemoteError {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The payload parsed as JSON but has an unusable shape.
    #[error("Unexpected payload shape: {0}")]
    ShapeError(String),

    /// Network or connection error.
    ///
    /// DNS failures, refused connections and broken transfers all land here.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A single source attempt exceeded its deadline.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing or construction failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The chain produced no data: the last source had nothing to offer,
    /// or no source was configured.
    #[error("No data source available: {0}")]
    NoSourceAvailable(String),

    /// No project with the requested id exists in the resolved list.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Every source failed; carries the terminal static-file error.
    #[error("Failed to load projects.json: {0}")]
    StaticFileFailed(#[source] Box<AppError>),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ConfigError(msg) => {
                format!(
                    "Configuration error: {}\n   Set FIREBASE_PROJECT_ID or FIREBASE_DB_URL, or edit your config file.",
                    msg
                )
            }
            AppError::RemoteError {
                status,
                status_text,
                ..
            } => {
                if *status == 401 || *status == 403 {
                    format!(
                        "Access denied by the data source ({} {}).\n   Check FIREBASE_AUTH_TOKEN.",
                        status, status_text
                    )
                } else if *status == 404 {
                    "The requested data was not found on the server.".to_string()
                } else {
                    format!("Data source error: HTTP {} {}", status, status_text)
                }
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!(
                    "Request timed out after {} seconds.\n   The server may be slow or unreachable.",
                    secs
                )
            }
            AppError::ProjectNotFound(id) => format!("Project not found: {}", id),
            AppError::StaticFileFailed(inner) => {
                format!("Failed to load projects.json\n   {}", inner.user_message())
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error should advance the fallback chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_core::error::AppError;
    ///
    /// assert!(AppError::NetworkError("connection reset".to_string()).is_fallback_trigger());
    /// assert!(AppError::ShapeError("number".to_string()).is_fallback_trigger());
    /// assert!(!AppError::ProjectNotFound("p1".to_string()).is_fallback_trigger());
    /// ```
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(
            self,
            AppError::ConfigError(_)
                | AppError::RemoteError { .. }
                | AppError::ShapeError(_)
                | AppError::NetworkError(_)
                | AppError::Timeout(_)
                | AppError::SerializationError(_)
                | AppError::Io(_)
                | AppError::InvalidUrl(_)
        )
    }
}
