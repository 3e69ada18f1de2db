use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid values.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("GOOGLE_API_JSON", r#"{"client_email":"svc@example.iam"}"#);
    m.insert("S3_BUCKET_NAME", "top-pages");
    m.insert("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
    m.insert("AWS_SECRET_ACCESS_KEY", "secret");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "TOPPAGES_ENV"));
}

#[test]
fn build_pipeline_config_succeeds_with_required_vars() {
    let map = full_env();
    let result = build_pipeline_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert!(matches!(cfg.credentials, CredentialSource::Inline(_)));
    assert_eq!(cfg.s3.bucket_name, "top-pages");
    assert_eq!(cfg.s3.object_key, "top_pages.json");
    assert_eq!(cfg.s3.region, "us-east-1");
    assert_eq!(cfg.s3.endpoint, "https://s3.amazonaws.com");
    assert!(cfg.s3.session_token.is_none());
    assert_eq!(cfg.ga_view_id, "154632053");
    assert_eq!(cfg.ga_base_url, "https://analyticsreporting.googleapis.com");
    assert_eq!(cfg.candidate_count, 20);
    assert_eq!(cfg.publish_count, 10);
    assert_eq!(cfg.site_origin, "https://www.roadmaptoreentry.org");
    assert_eq!(cfg.title_suffix(), " - Roadmap to Reentry");
    assert_eq!(cfg.strip_path_prefix, "/roadmap-to-reentry");
    assert_eq!(cfg.search_title_template, "Search results for \"{q}\"");
    assert_eq!(cfg.check_failure_policy, CheckFailurePolicy::Abort);
    assert_eq!(cfg.validate_concurrency, 1);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "toppages/0.1 (top-pages-publisher)");
}

#[test]
fn build_pipeline_config_fails_without_credentials() {
    let mut map = full_env();
    map.remove("GOOGLE_API_JSON");
    let result = build_pipeline_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "GOOGLE_API_JSON"),
        "expected MissingEnvVar(GOOGLE_API_JSON), got: {result:?}"
    );
}

#[test]
fn build_pipeline_config_accepts_credentials_file() {
    let mut map = full_env();
    map.remove("GOOGLE_API_JSON");
    map.insert("GOOGLE_APPLICATION_CREDENTIALS", "/etc/toppages/key.json");
    let cfg = build_pipeline_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.credentials,
        CredentialSource::File(PathBuf::from("/etc/toppages/key.json"))
    );
}

#[test]
fn build_pipeline_config_prefers_inline_credentials() {
    let mut map = full_env();
    map.insert("GOOGLE_APPLICATION_CREDENTIALS", "/etc/toppages/key.json");
    let cfg = build_pipeline_config(lookup_from_map(&map)).unwrap();
    assert!(matches!(cfg.credentials, CredentialSource::Inline(_)));
}

#[test]
fn build_pipeline_config_fails_without_bucket() {
    let mut map = full_env();
    map.remove("S3_BUCKET_NAME");
    let result = build_pipeline_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "S3_BUCKET_NAME"),
        "expected MissingEnvVar(S3_BUCKET_NAME), got: {result:?}"
    );
}

#[test]
fn build_pipeline_config_treats_empty_bucket_as_missing() {
    let mut map = full_env();
    map.insert("S3_BUCKET_NAME", "");
    let result = build_pipeline_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_pipeline_config_fails_without_aws_secret() {
    let mut map = full_env();
    map.remove("AWS_SECRET_ACCESS_KEY");
    let result = build_pipeline_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "AWS_SECRET_ACCESS_KEY"),
        "expected MissingEnvVar(AWS_SECRET_ACCESS_KEY), got: {result:?}"
    );
}

#[test]
fn build_pipeline_config_derives_regional_endpoint() {
    let mut map = full_env();
    map.insert("AWS_REGION", "eu-west-2");
    let cfg = build_pipeline_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.s3.region, "eu-west-2");
    assert_eq!(cfg.s3.endpoint, "https://s3.eu-west-2.amazonaws.com");
}

#[test]
fn build_pipeline_config_falls_back_to_default_region_var() {
    let mut map = full_env();
    map.insert("AWS_DEFAULT_REGION", "us-west-1");
    let cfg = build_pipeline_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.s3.region, "us-west-1");
}

#[test]
fn build_pipeline_config_endpoint_override_wins() {
    let mut map = full_env();
    map.insert("AWS_REGION", "eu-west-2");
    map.insert("TOPPAGES_S3_ENDPOINT", "http://localhost:9000");
    let cfg = build_pipeline_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.s3.endpoint, "http://localhost:9000");
}

#[test]
fn build_pipeline_config_candidate_count_invalid() {
    let mut map = full_env();
    map.insert("TOPPAGES_CANDIDATE_COUNT", "twenty");
    let result = build_pipeline_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TOPPAGES_CANDIDATE_COUNT"
        ),
        "expected InvalidEnvVar(TOPPAGES_CANDIDATE_COUNT), got: {result:?}"
    );
}

#[test]
fn build_pipeline_config_publish_count_override() {
    let mut map = full_env();
    map.insert("TOPPAGES_PUBLISH_COUNT", "5");
    let cfg = build_pipeline_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.publish_count, 5);
}

#[test]
fn build_pipeline_config_check_failure_policy_invalid_value() {
    let mut map = full_env();
    map.insert("TOPPAGES_CHECK_FAILURE_POLICY", "invalid");
    let cfg = build_pipeline_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.check_failure_policy, CheckFailurePolicy::TreatAsInvalid);
}

#[test]
fn build_pipeline_config_check_failure_policy_unknown() {
    let mut map = full_env();
    map.insert("TOPPAGES_CHECK_FAILURE_POLICY", "ignore");
    let result = build_pipeline_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "TOPPAGES_CHECK_FAILURE_POLICY"
        ),
        "expected InvalidEnvVar(TOPPAGES_CHECK_FAILURE_POLICY), got: {result:?}"
    );
}

#[test]
fn build_pipeline_config_rejects_zero_concurrency() {
    let mut map = full_env();
    map.insert("TOPPAGES_VALIDATE_CONCURRENCY", "0");
    let result = build_pipeline_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "TOPPAGES_VALIDATE_CONCURRENCY"
        ),
        "expected InvalidEnvVar(TOPPAGES_VALIDATE_CONCURRENCY), got: {result:?}"
    );
}

#[test]
fn build_pipeline_config_site_overrides() {
    let mut map = full_env();
    map.insert("TOPPAGES_SITE_NAME", "Site");
    map.insert("TOPPAGES_SITE_ORIGIN", "http://127.0.0.1:8080");
    map.insert("TOPPAGES_STRIP_PATH_PREFIX", "/mirror");
    let cfg = build_pipeline_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.title_suffix(), " - Site");
    assert_eq!(cfg.site_origin, "http://127.0.0.1:8080");
    assert_eq!(cfg.strip_path_prefix, "/mirror");
}

#[test]
fn pipeline_config_debug_redacts_secrets() {
    let mut map = full_env();
    map.insert("AWS_SESSION_TOKEN", "session-token-value");
    let cfg = build_pipeline_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("\"secret\""), "secret key leaked: {debug}");
    assert!(!debug.contains("session-token-value"), "token leaked: {debug}");
    assert!(!debug.contains("svc@example.iam"), "credentials leaked: {debug}");
    assert!(debug.contains("[redacted]"));
}

#[test]
fn build_server_config_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_server_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
}

#[test]
fn build_server_config_fails_with_invalid_bind_addr() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("TOPPAGES_BIND_ADDR", "not-a-socket-addr");
    let result = build_server_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TOPPAGES_BIND_ADDR"
        ),
        "expected InvalidEnvVar(TOPPAGES_BIND_ADDR), got: {result:?}"
    );
}
