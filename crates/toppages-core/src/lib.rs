//! Shared types and configuration for the top-pages publisher.

mod app_config;
mod config;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app_config::{
    CheckFailurePolicy, CredentialSource, Environment, PipelineConfig, S3Settings, ServerConfig,
};
pub use config::{
    load_pipeline_config, load_pipeline_config_from_env, load_server_config,
    load_server_config_from_env,
};

/// One page in the published top-pages list.
///
/// Field order is part of the artifact format: `url` is serialized before
/// `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
}

impl PageRecord {
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
