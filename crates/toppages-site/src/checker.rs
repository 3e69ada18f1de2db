//! Liveness checks for candidate pages on the public site.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use toppages_core::PageRecord;

use crate::error::SiteError;

/// Result of checking one page against the live site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCheck {
    /// The page answered `200 OK`.
    Valid,
    /// The page answered with some other status.
    Invalid { status: u16 },
    /// No status could be obtained (network failure, timeout).
    CheckFailed { reason: String },
}

impl PageCheck {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, PageCheck::Valid)
    }
}

/// Issues one GET per page against a fixed site origin.
pub struct SiteChecker {
    client: Client,
    origin: Url,
    strip_path_prefix: String,
}

impl SiteChecker {
    /// Creates a checker for `origin`.
    ///
    /// `strip_path_prefix` is removed from the front of every page path before
    /// it is appended to the origin's path; pass `""` to disable. A path on
    /// the origin itself (`https://host/site`) is kept as a base.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidOrigin`] if `origin` is not an absolute
    /// URL, or [`SiteError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        origin: &str,
        strip_path_prefix: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SiteError> {
        let origin = Url::parse(origin).map_err(|e| SiteError::InvalidOrigin {
            origin: origin.to_owned(),
            reason: e.to_string(),
        })?;
        if origin.cannot_be_a_base() {
            return Err(SiteError::InvalidOrigin {
                origin: origin.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            origin,
            strip_path_prefix: strip_path_prefix.to_owned(),
        })
    }

    /// Absolute URL that [`SiteChecker::check`] requests for `page_url`.
    ///
    /// Only the path and query of `page_url` are used; they are appended to
    /// the origin's own path. Scheme and host always come from the origin,
    /// so `//other.host/x` or `https://other.host/x` still resolve to a path
    /// on the configured site.
    #[must_use]
    pub fn resolve(&self, page_url: &str) -> Url {
        let stripped = strip_path_prefix(page_url, &self.strip_path_prefix);
        let without_fragment = stripped
            .split_once('#')
            .map_or(stripped.as_str(), |(head, _)| head);
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_fragment, None),
        };

        let base = self.origin.path().trim_end_matches('/');
        let relative = path.trim_start_matches(['/', '\\']);

        let mut url = self.origin.clone();
        url.set_path(&format!("{base}/{relative}"));
        url.set_query(query);
        url.set_fragment(None);
        url
    }

    /// Requests the page and classifies the response.
    ///
    /// Redirects are followed; the final status decides.
    pub async fn check(&self, record: &PageRecord) -> PageCheck {
        let url = self.resolve(&record.url);

        match self.client.get(url.clone()).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::debug!(url = %url, "page is live");
                PageCheck::Valid
            }
            Ok(response) => {
                let status = response.status().as_u16();
                tracing::info!(url = %url, status, "page is not live");
                PageCheck::Invalid { status }
            }
            Err(e) => PageCheck::CheckFailed {
                reason: format!("GET {url} failed: {e}"),
            },
        }
    }
}

/// Removes `prefix` from the front of `page_url` when it covers whole path
/// segments. `"/prefix"` becomes `"/"`, `"/prefix/a"` becomes `"/a"`, and
/// `"/prefixed"` is left alone.
fn strip_path_prefix(page_url: &str, prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return page_url.to_owned();
    }

    match page_url.strip_prefix(prefix) {
        Some("") => "/".to_owned(),
        Some(rest) if rest.starts_with('/') => rest.to_owned(),
        Some(rest) if rest.starts_with('?') || rest.starts_with('#') => format!("/{rest}"),
        _ => page_url.to_owned(),
    }
}
