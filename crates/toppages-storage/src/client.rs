use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Method, Url};
use toppages_core::S3Settings;

use crate::error::StorageError;
use crate::sigv4::sign_request;
use crate::types::{create_bucket_configuration, ListAllMyBucketsResult};

/// Region whose `CreateBucket` call must not carry a location constraint.
const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Path-style S3 client signing every request with `SigV4`.
#[derive(Debug)]
pub struct S3Client {
    client: Client,
    endpoint: Url,
    region: String,
    credentials: AwsCredentials,
}

impl S3Client {
    /// Builds a client from runtime settings.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidEndpoint`] if `settings.endpoint` is not
    /// an absolute http(s) URL, or [`StorageError::Http`] if the
    /// `reqwest::Client` cannot be built.
    pub fn new(
        settings: &S3Settings,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StorageError> {
        let credentials = AwsCredentials {
            access_key_id: settings.access_key_id.clone(),
            secret_access_key: settings.secret_access_key.clone(),
            session_token: settings.session_token.clone(),
        };
        Self::with_endpoint(
            &settings.endpoint,
            &settings.region,
            credentials,
            timeout_secs,
            user_agent,
        )
    }

    /// Builds a client against an explicit endpoint (S3-compatible store or a
    /// test server).
    ///
    /// # Errors
    ///
    /// Same as [`S3Client::new`].
    pub fn with_endpoint(
        endpoint: &str,
        region: &str,
        credentials: AwsCredentials,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StorageError> {
        let endpoint = parse_endpoint(endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            region: region.to_owned(),
            credentials,
        })
    }

    /// Names of every bucket owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnexpectedStatus`] on a non-2xx answer, or
    /// [`StorageError::Xml`] if the body is not a `ListAllMyBucketsResult`.
    pub async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let url = self.url_for(&[])?;
        let body = self
            .send("ListBuckets", Method::GET, url, &[], Vec::new())
            .await?;

        let parsed: ListAllMyBucketsResult =
            quick_xml::de::from_str(&body).map_err(|source| StorageError::Xml {
                context: "ListBuckets response".to_string(),
                source,
            })?;
        Ok(parsed
            .buckets
            .bucket
            .into_iter()
            .map(|bucket| bucket.name)
            .collect())
    }

    /// Creates `bucket` in the client's region.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnexpectedStatus`] on a non-2xx answer,
    /// including `BucketAlreadyExists` when the name is taken by another
    /// account.
    pub async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let url = self.url_for(&[bucket])?;
        let body = if self.region == DEFAULT_REGION {
            Vec::new()
        } else {
            create_bucket_configuration(&self.region).into_bytes()
        };
        self.send("CreateBucket", Method::PUT, url, &[], body)
            .await?;
        Ok(())
    }

    /// Creates `bucket` unless it is already listed. Returns `true` when the
    /// bucket was created by this call.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`S3Client::list_buckets`] and
    /// [`S3Client::create_bucket`].
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<bool, StorageError> {
        let existing = self.list_buckets().await?;
        if existing.iter().any(|name| name == bucket) {
            tracing::debug!(bucket, "bucket already exists");
            return Ok(false);
        }

        tracing::info!(bucket, region = %self.region, "creating bucket");
        self.create_bucket(bucket).await?;
        Ok(true)
    }

    /// Uploads `body` to `bucket/key`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnexpectedStatus`] on a non-2xx answer.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = self.object_url(bucket, key)?;
        self.send(
            "PutObject",
            Method::PUT,
            url,
            &[("content-type", content_type)],
            body,
        )
        .await?;
        Ok(())
    }

    /// Applies a canned ACL such as `public-read` to an existing object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnexpectedStatus`] on a non-2xx answer.
    pub async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        canned_acl: &str,
    ) -> Result<(), StorageError> {
        let mut url = self.object_url(bucket, key)?;
        url.set_query(Some("acl"));
        self.send(
            "PutObjectAcl",
            Method::PUT,
            url,
            &[("x-amz-acl", canned_acl)],
            Vec::new(),
        )
        .await?;
        Ok(())
    }

    /// Every `/`-separated part of `key` becomes one path segment, empty parts
    /// included, so the object is stored under exactly the configured key.
    fn object_url(&self, bucket: &str, key: &str) -> Result<Url, StorageError> {
        let mut segments = vec![bucket];
        segments.extend(key.split('/'));
        self.url_for(&segments)
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url, StorageError> {
        let mut url = self.endpoint.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| StorageError::InvalidEndpoint {
                    endpoint: self.endpoint.to_string(),
                    reason: "URL cannot be used as a base".to_string(),
                })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        if segments.is_empty() && !url.path().ends_with('/') {
            let joined = format!("{}/", url.path());
            url.set_path(&joined);
        }
        Ok(url)
    }

    /// Signs and sends one request, returning the response body on 2xx.
    async fn send(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<String, StorageError> {
        let signed = sign_request(
            &self.credentials,
            &self.region,
            method.as_str(),
            &url,
            headers,
            &body,
            Utc::now(),
        )?;

        tracing::debug!(operation, method = %method, url = %url, bytes = body.len(), "S3 request");

        let mut request = self.client.request(method, url);
        for (name, value) in &signed {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.body(body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, StorageError> {
    let url = Url::parse(endpoint).map_err(|e| StorageError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(StorageError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: "expected an absolute http(s) URL".to_string(),
        });
    }
    Ok(url)
}
