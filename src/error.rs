use thiserror::Error;

/// Raised before any network I/O when the adapter cannot be configured.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{0} is not set")]
    MissingCredential(String),
}

/// Failure of the generation call itself.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The key cannot be carried in a request header.
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer carrying Google's error envelope.
    #[error("{code} {status}. {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    /// Non-2xx answer whose body could not be decoded.
    #[error("HTTP {code}: {body}")]
    Http { code: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("prompt blocked: {0}")]
    Blocked(String),

    #[error("response contained no text")]
    EmptyResponse,
}
