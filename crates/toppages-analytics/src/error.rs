use thiserror::Error;

/// Errors returned while loading credentials or talking to the reporting API.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Network or TLS failure, or a non-2xx status from the reporting API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service-account key could not be read or parsed.
    #[error("could not load credentials from {context}: {reason}")]
    Credentials { context: String, reason: String },

    /// The token endpoint refused the JWT assertion.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The RS256 assertion could not be signed (usually a bad private key).
    #[error("JWT signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A report row did not carry exactly the `(title, path)` dimensions.
    #[error("report row {index} has {found} dimensions, expected 2 (title, path)")]
    MalformedRow { index: usize, found: usize },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
