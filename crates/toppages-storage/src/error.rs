use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// S3 answered with a non-2xx status; `body` carries the XML error document.
    #[error("{operation} returned unexpected HTTP status {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("XML deserialization error for {context}: {source}")]
    Xml {
        context: String,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("could not serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("invalid S3 endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}
