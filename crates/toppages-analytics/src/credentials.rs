//! Service-account key loading.
//!
//! Keys arrive either as a file on disk or as a JSON blob in an environment
//! variable. Env-var transport tends to turn the `\n` escapes inside the PEM
//! body into real line breaks, which JSON forbids inside strings, so the blob
//! path runs [`escape_raw_newlines`] before parsing.

use std::path::Path;

use serde::Deserialize;
use toppages_core::CredentialSource;

use crate::error::AnalyticsError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The subset of a Google service-account key file this crate needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[redacted]")
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Loads a key from whichever source the configuration names.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Credentials`] if the key cannot be read or
    /// parsed.
    pub fn load(source: &CredentialSource) -> Result<Self, AnalyticsError> {
        match source {
            CredentialSource::Inline(raw) => Self::from_env_blob(raw),
            CredentialSource::File(path) => Self::from_file(path),
        }
    }

    /// Parses a key passed through an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Credentials`] if the blob is not a valid key.
    pub fn from_env_blob(raw: &str) -> Result<Self, AnalyticsError> {
        let escaped = escape_raw_newlines(raw);
        serde_json::from_str(&escaped).map_err(|e| AnalyticsError::Credentials {
            context: "environment".to_string(),
            reason: e.to_string(),
        })
    }

    /// Reads and parses a key file verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Credentials`] if the file cannot be read or
    /// does not contain a valid key.
    pub fn from_file(path: &Path) -> Result<Self, AnalyticsError> {
        let context = path.display().to_string();
        let body = std::fs::read_to_string(path).map_err(|e| AnalyticsError::Credentials {
            context: context.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|e| AnalyticsError::Credentials {
            context,
            reason: e.to_string(),
        })
    }
}

/// Replaces literal line breaks inside JSON string literals with `\n`.
///
/// Line breaks between tokens are left alone, so pretty-printed blobs still
/// parse. Escape sequences already present are copied through untouched.
#[must_use]
pub fn escape_raw_newlines(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in raw.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(ch);
                continue;
            }
            match ch {
                '\\' => {
                    escaped = true;
                    out.push(ch);
                }
                '"' => {
                    in_string = false;
                    out.push(ch);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                _ => out.push(ch),
            }
        } else {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
        }
    }

    out
}
