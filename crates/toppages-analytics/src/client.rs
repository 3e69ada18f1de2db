//! HTTP client for the Google Analytics Reporting API v4.
//!
//! Wraps `reqwest` with service-account authentication and typed response
//! deserialization. Only the single `reports:batchGet` call the publisher
//! needs is exposed.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::auth::{fetch_access_token, ANALYTICS_READONLY_SCOPE};
use crate::credentials::ServiceAccountKey;
use crate::error::AnalyticsError;
use crate::types::{BatchGetRequest, BatchGetResponse, ReportRequest, ReportRow};

const DEFAULT_BASE_URL: &str = "https://analyticsreporting.googleapis.com";

/// Authorized client for the reporting API.
///
/// Use [`AnalyticsClient::connect`] to authenticate with a service-account key,
/// or [`AnalyticsClient::with_bearer_token`] when a token is already at hand
/// (tests, externally managed auth).
pub struct AnalyticsClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl std::fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl AnalyticsClient {
    /// Exchanges `key` for an access token and returns a client pointed at
    /// `base_url` (pass `None` for the production API).
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::InvalidBaseUrl`] if `base_url` cannot be parsed.
    /// - [`AnalyticsError::Signing`] / [`AnalyticsError::TokenExchange`] /
    ///   [`AnalyticsError::Http`] if authentication fails.
    pub async fn connect(
        key: &ServiceAccountKey,
        base_url: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AnalyticsError> {
        let client = build_http_client(timeout_secs, user_agent)?;
        let base_url = parse_base_url(base_url.unwrap_or(DEFAULT_BASE_URL))?;
        let access_token = fetch_access_token(&client, key, ANALYTICS_READONLY_SCOPE).await?;
        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    /// Builds a client that sends a pre-issued bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`AnalyticsError::InvalidBaseUrl`] for a bad URL.
    pub fn with_bearer_token(
        access_token: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AnalyticsError> {
        Ok(Self {
            client: build_http_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
            access_token: access_token.to_owned(),
        })
    }

    /// Runs one report and returns its rows in the order the API sent them.
    ///
    /// A report with no `rows` (no traffic in the window) yields an empty
    /// list.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`AnalyticsError::Deserialize`] if the body is not the expected
    ///   shape or carries no report.
    pub async fn fetch_report(
        &self,
        request: &ReportRequest,
    ) -> Result<Vec<ReportRow>, AnalyticsError> {
        let url = self.batch_get_url();
        let body = BatchGetRequest {
            report_requests: [request],
        };

        tracing::debug!(
            view_id = %request.view_id,
            page_size = request.page_size,
            "requesting report"
        );

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        let parsed: BatchGetResponse =
            serde_json::from_str(&text).map_err(|e| AnalyticsError::Deserialize {
                context: format!("reports:batchGet(viewId={})", request.view_id),
                source: e,
            })?;

        let report = parsed.reports.into_iter().next().ok_or_else(|| {
            AnalyticsError::Deserialize {
                context: format!("reports:batchGet(viewId={})", request.view_id),
                source: serde::de::Error::custom("response contained no reports"),
            }
        })?;

        Ok(report.data.rows)
    }

    fn batch_get_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!(
            "{}/v4/reports:batchGet",
            self.base_url.path().trim_end_matches('/')
        ));
        url
    }
}

fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, AnalyticsError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

fn parse_base_url(raw: &str) -> Result<Url, AnalyticsError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| AnalyticsError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> AnalyticsClient {
        AnalyticsClient::with_bearer_token("token", base_url, 30, "toppages-test/0.1")
            .expect("client construction should not fail")
    }

    #[test]
    fn batch_get_url_appends_endpoint_path() {
        let client = test_client("https://analyticsreporting.googleapis.com");
        assert_eq!(
            client.batch_get_url().as_str(),
            "https://analyticsreporting.googleapis.com/v4/reports:batchGet"
        );
    }

    #[test]
    fn batch_get_url_keeps_base_path_prefix() {
        let client = test_client("http://127.0.0.1:9000/proxy/");
        assert_eq!(
            client.batch_get_url().as_str(),
            "http://127.0.0.1:9000/proxy/v4/reports:batchGet"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = AnalyticsClient::with_bearer_token("t", "not a url", 30, "ua").unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn debug_redacts_access_token() {
        let client = AnalyticsClient::with_bearer_token(
            "super-secret-token",
            "https://analyticsreporting.googleapis.com",
            30,
            "ua",
        )
        .unwrap();
        assert!(!format!("{client:?}").contains("super-secret-token"));
    }
}
