use thiserror::Error;

/// Every failure the server layer can produce. The UI treats them all as
/// "operation failed" and only shows the `Display` text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The server answered with an `{"error": ...}` body.
    #[error("{0}")]
    Server(String),

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The push channel request could not be built.
    #[error("Cannot open push channel: {0}")]
    SocketSetup(String),

    #[error("WebSocket not connected. Please select a chat first.")]
    NotConnected,
}

pub type ApiResult<T> = Result<T, ApiError>;
