use std::env::VarError;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::app_config::{
    CheckFailurePolicy, CredentialSource, Environment, PipelineConfig, S3Settings, ServerConfig,
};
use crate::ConfigError;

const DEFAULT_REGION: &str = "us-east-1";

/// Load the publisher configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_pipeline_config() -> Result<PipelineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_pipeline_config_from_env()
}

/// Load the publisher configuration from variables already in the process.
///
/// Unlike [`load_pipeline_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_pipeline_config_from_env() -> Result<PipelineConfig, ConfigError> {
    build_pipeline_config(|key| std::env::var(key))
}

/// Load the home-page server configuration, reading `.env` first.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_server_config() -> Result<ServerConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_server_config_from_env()
}

/// Load the server configuration from variables already in the process.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_server_config_from_env() -> Result<ServerConfig, ConfigError> {
    build_server_config(|key| std::env::var(key))
}

/// Small helper bundle over an env-var lookup function.
///
/// Keeps the parsing rules in one place so both config builders can be tested
/// with a plain `HashMap` lookup instead of mutating the process environment.
struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    fn get(&self, var: &str) -> Option<String> {
        (self.lookup)(var).ok().filter(|v| !v.is_empty())
    }

    fn require(&self, var: &str) -> Result<String, ConfigError> {
        self.get(var)
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    }

    fn or_default(&self, var: &str, default: &str) -> String {
        self.get(var).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, var: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.or_default(var, default);
        raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    }

    fn environment(&self) -> Result<Environment, ConfigError> {
        parse_environment(&self.or_default("TOPPAGES_ENV", "development"))
    }
}

fn build_pipeline_config<F>(lookup: F) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let env_vars = Env { lookup };

    let env = env_vars.environment()?;
    let log_level = env_vars.or_default("TOPPAGES_LOG_LEVEL", "info");

    let credentials = if let Some(blob) = env_vars.get("GOOGLE_API_JSON") {
        CredentialSource::Inline(blob)
    } else if let Some(path) = env_vars.get("GOOGLE_APPLICATION_CREDENTIALS") {
        CredentialSource::File(PathBuf::from(path))
    } else {
        return Err(ConfigError::MissingEnvVar("GOOGLE_API_JSON".to_string()));
    };

    let bucket_name = env_vars.require("S3_BUCKET_NAME")?;
    let access_key_id = env_vars.require("AWS_ACCESS_KEY_ID")?;
    let secret_access_key = env_vars.require("AWS_SECRET_ACCESS_KEY")?;
    let session_token = env_vars.get("AWS_SESSION_TOKEN");
    let region = env_vars
        .get("AWS_REGION")
        .or_else(|| env_vars.get("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|| DEFAULT_REGION.to_string());
    let endpoint = env_vars
        .get("TOPPAGES_S3_ENDPOINT")
        .unwrap_or_else(|| default_s3_endpoint(&region));
    let object_key = env_vars.or_default("TOPPAGES_OBJECT_KEY", "top_pages.json");

    let ga_view_id = env_vars.or_default("TOPPAGES_GA_VIEW_ID", "154632053");
    let ga_base_url = env_vars.or_default(
        "TOPPAGES_GA_BASE_URL",
        "https://analyticsreporting.googleapis.com",
    );
    let candidate_count = env_vars.parse::<u32>("TOPPAGES_CANDIDATE_COUNT", "20")?;
    let publish_count = env_vars.parse::<usize>("TOPPAGES_PUBLISH_COUNT", "10")?;

    let site_origin =
        env_vars.or_default("TOPPAGES_SITE_ORIGIN", "https://www.roadmaptoreentry.org");
    let site_name = env_vars.or_default("TOPPAGES_SITE_NAME", "Roadmap to Reentry");
    let strip_path_prefix =
        env_vars.or_default("TOPPAGES_STRIP_PATH_PREFIX", "/roadmap-to-reentry");
    let search_title_template = env_vars.or_default(
        "TOPPAGES_SEARCH_TITLE_TEMPLATE",
        "Search results for \"{q}\"",
    );
    let check_failure_policy = parse_check_failure_policy(
        &env_vars.or_default("TOPPAGES_CHECK_FAILURE_POLICY", "abort"),
    )?;

    let validate_concurrency = env_vars.parse::<usize>("TOPPAGES_VALIDATE_CONCURRENCY", "1")?;
    if validate_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TOPPAGES_VALIDATE_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let request_timeout_secs = env_vars.parse::<u64>("TOPPAGES_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent =
        env_vars.or_default("TOPPAGES_USER_AGENT", "toppages/0.1 (top-pages-publisher)");

    Ok(PipelineConfig {
        env,
        log_level,
        credentials,
        s3: S3Settings {
            bucket_name,
            object_key,
            region,
            endpoint,
            access_key_id,
            secret_access_key,
            session_token,
        },
        ga_view_id,
        ga_base_url,
        candidate_count,
        publish_count,
        site_origin,
        site_name,
        strip_path_prefix,
        search_title_template,
        check_failure_policy,
        validate_concurrency,
        request_timeout_secs,
        user_agent,
    })
}

fn build_server_config<F>(lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let env_vars = Env { lookup };

    Ok(ServerConfig {
        env: env_vars.environment()?,
        log_level: env_vars.or_default("TOPPAGES_LOG_LEVEL", "info"),
        bind_addr: env_vars.parse::<SocketAddr>("TOPPAGES_BIND_ADDR", "0.0.0.0:3000")?,
    })
}

/// Virtual-host-free S3 endpoint for a region. `us-east-1` keeps the legacy
/// global hostname.
fn default_s3_endpoint(region: &str) -> String {
    if region == DEFAULT_REGION {
        "https://s3.amazonaws.com".to_string()
    } else {
        format!("https://s3.{region}.amazonaws.com")
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TOPPAGES_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_check_failure_policy(s: &str) -> Result<CheckFailurePolicy, ConfigError> {
    match s {
        "abort" => Ok(CheckFailurePolicy::Abort),
        "invalid" => Ok(CheckFailurePolicy::TreatAsInvalid),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TOPPAGES_CHECK_FAILURE_POLICY".to_string(),
            reason: format!("expected abort or invalid; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
