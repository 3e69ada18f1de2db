//! OAuth 2.0 JWT-bearer grant for service accounts.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::credentials::ServiceAccountKey;
use crate::error::AnalyticsError;

pub(crate) const ANALYTICS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/analytics.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the assertion; Google caps it at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Builds the signed RS256 assertion for `key`, issued at `issued_at`.
pub(crate) fn build_assertion(
    key: &ServiceAccountKey,
    scope: &str,
    issued_at: i64,
) -> Result<String, AnalyticsError> {
    let claims = Claims {
        iss: &key.client_email,
        scope,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid.clone_from(&key.private_key_id);
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
}

/// Exchanges a signed assertion for an access token at the key's token URI.
///
/// # Errors
///
/// - [`AnalyticsError::Signing`] if the private key cannot sign.
/// - [`AnalyticsError::Http`] on network failure.
/// - [`AnalyticsError::TokenExchange`] if the endpoint answers non-2xx or
///   returns a body without `access_token`.
pub(crate) async fn fetch_access_token(
    client: &reqwest::Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> Result<String, AnalyticsError> {
    let assertion = build_assertion(key, scope, chrono::Utc::now().timestamp())?;

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AnalyticsError::TokenExchange(format!(
            "token endpoint returned status {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AnalyticsError::TokenExchange(format!("token parse error: {e}")))?;

    tracing::debug!(client_email = %key.client_email, "obtained analytics access token");
    Ok(token.access_token)
}
