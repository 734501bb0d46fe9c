use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlimpseError {
    /// Malformed or empty query input. Never reaches the network.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The upload relay rejected the file or returned a malformed body.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// The search backend answered with a non-success status.
    #[error("Search backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Network failure or an unparseable response body.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlimpseError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Generic message used when the backend gives no error body.
    pub const GENERIC_BACKEND_MESSAGE: &'static str = "Search failed";
}

impl From<reqwest::Error> for GlimpseError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GlimpseError>;
