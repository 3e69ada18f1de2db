use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid site origin \"{origin}\": {reason}")]
    InvalidOrigin { origin: String, reason: String },
}
