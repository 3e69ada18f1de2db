use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where the analytics service-account key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Raw JSON blob taken from an environment variable.
    Inline(String),
    /// Path to a key file on disk.
    File(PathBuf),
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Inline(_) => f.write_str("Inline([redacted])"),
            CredentialSource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// What the pipeline does with a page whose liveness check could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckFailurePolicy {
    /// Abort the whole run; nothing is published.
    Abort,
    /// Count the page as invalid and carry on.
    TreatAsInvalid,
}

#[derive(Clone)]
pub struct S3Settings {
    pub bucket_name: String,
    pub object_key: String,
    pub region: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("bucket_name", &self.bucket_name)
            .field("object_key", &self.object_key)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Everything one run of the publisher needs, built once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub env: Environment,
    pub log_level: String,
    pub credentials: CredentialSource,
    pub s3: S3Settings,
    pub ga_view_id: String,
    pub ga_base_url: String,
    pub candidate_count: u32,
    pub publish_count: usize,
    pub site_origin: String,
    pub site_name: String,
    pub strip_path_prefix: String,
    pub search_title_template: String,
    pub check_failure_policy: CheckFailurePolicy,
    pub validate_concurrency: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl PipelineConfig {
    /// Suffix the analytics source appends to every page title.
    #[must_use]
    pub fn title_suffix(&self) -> String {
        format!(" - {}", self.site_name)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub env: Environment,
    pub log_level: String,
    pub bind_addr: SocketAddr,
}
