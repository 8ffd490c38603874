use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Errors surfaced to callers of a scrape.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Rejected before any browser work started
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The browser session failed; carries the underlying message
    #[error("scrape failed: {0}")]
    ScrapeFailed(String),
}

/// Failures raised by a rendering session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not start a WebDriver session: {0}")]
    Connect(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{action} timed out after {millis} ms")]
    Timeout { action: &'static str, millis: u64 },

    #[error("WebDriver command failed: {0}")]
    Command(String),
}

impl From<SessionError> for ScrapeError {
    fn from(err: SessionError) -> Self {
        ScrapeError::ScrapeFailed(err.to_string())
    }
}

impl From<fantoccini::error::CmdError> for SessionError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        SessionError::Command(err.to_string())
    }
}

/// Errors raised while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
