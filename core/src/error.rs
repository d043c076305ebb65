use thiserror::Error;

/// Client-side rejections raised before any request leaves the app.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a target price")]
    MissingPrice,

    #[error("Target price must be a positive number, got {0:?}")]
    InvalidPrice(String),

    #[error("No live quote available for the selected symbol")]
    NoQuote,

    #[error("Please enter a meeting title")]
    MissingTitle,

    #[error("Please enter meeting content")]
    MissingContent,

    #[error("Please select a file")]
    MissingFile,

    #[error("Only .txt and .docx files are supported (got {0:?})")]
    UnsupportedFile(String),
}

/// Failures decoding a stream frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed stream payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("stream payload is missing the `type` discriminator")]
    MissingType,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("unsupported backend scheme {0:?}; expected http or https")]
    UnsupportedScheme(String),
}
