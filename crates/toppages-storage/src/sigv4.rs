//! AWS Signature Version 4 for S3 requests.
//!
//! Signs with the payload hash in `x-amz-content-sha256`, as S3 requires.
//! The canonical URI is rebuilt from the decoded path so that what is signed
//! matches what S3 reconstructs on its side.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::client::AwsCredentials;
use crate::error::StorageError;

type HmacSha256 = Hmac<Sha256>;
type Digest32 = sha2::digest::Output<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Everything except the RFC 3986 unreserved characters gets encoded.
const URI_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Headers to attach to a request, all lowercase names.
pub(crate) type SignedHeaders = Vec<(String, String)>;

pub(crate) fn hex_sha256(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Digest32, StorageError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| StorageError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes())
}

/// `kSigning` from the `SigV4` key-derivation chain.
pub(crate) fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Digest32, StorageError> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn canonical_uri(url: &Url) -> String {
    let encoded: Vec<String> = url
        .path()
        .split('/')
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            utf8_percent_encode(&decoded, URI_ENCODE).to_string()
        })
        .collect();
    let joined = encoded.join("/");
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            (
                utf8_percent_encode(&k, URI_ENCODE).to_string(),
                utf8_percent_encode(&v, URI_ENCODE).to_string(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// `Host` header value as the HTTP client will send it.
fn host_header(url: &Url) -> Result<String, StorageError> {
    let host = url
        .host_str()
        .ok_or_else(|| StorageError::Signing(format!("URL has no host: {url}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

pub(crate) fn canonical_request(
    method: &str,
    url: &Url,
    headers: &BTreeMap<String, String>,
    payload_hash: &str,
) -> String {
    let canonical_headers = headers
        .iter()
        .map(|(name, value)| format!("{name}:{}", value.trim()))
        .collect::<Vec<_>>()
        .join("\n");
    let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

    format!(
        "{method}\n{}\n{}\n{canonical_headers}\n\n{signed_headers}\n{payload_hash}",
        canonical_uri(url),
        canonical_query(url),
    )
}

/// Signs one request and returns the headers that must accompany it:
/// `x-amz-date`, `x-amz-content-sha256`, `x-amz-security-token` (when a
/// session token is set), the caller's `extra_headers`, and `authorization`.
///
/// `extra_headers` are signed too, so they must be sent exactly as given.
pub(crate) fn sign_request(
    credentials: &AwsCredentials,
    region: &str,
    method: &str,
    url: &Url,
    extra_headers: &[(&str, &str)],
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<SignedHeaders, StorageError> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let payload_hash = hex_sha256(payload);

    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    headers.insert("host".to_string(), host_header(url)?);
    headers.insert("x-amz-content-sha256".to_string(), payload_hash.clone());
    headers.insert("x-amz-date".to_string(), amz_date.clone());
    if let Some(token) = &credentials.session_token {
        headers.insert("x-amz-security-token".to_string(), token.clone());
    }
    for (name, value) in extra_headers {
        headers.insert(name.to_ascii_lowercase(), (*value).to_string());
    }

    let canonical = canonical_request(method, url, &headers, &payload_hash);
    let scope = format!("{date}/{region}/{SERVICE}/aws4_request");
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex_sha256(canonical.as_bytes())
    );

    let key = signing_key(&credentials.secret_access_key, &date, region, SERVICE)?;
    let signature = format!("{:x}", hmac(&key, string_to_sign.as_bytes())?);
    let signed_header_names = headers.keys().cloned().collect::<Vec<_>>().join(";");

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, \
         SignedHeaders={signed_header_names}, Signature={signature}",
        credentials.access_key_id
    );

    // Host is set by the HTTP client from the URL.
    headers.remove("host");
    let mut out: SignedHeaders = headers.into_iter().collect();
    out.push(("authorization".to_string(), authorization));
    Ok(out)
}
