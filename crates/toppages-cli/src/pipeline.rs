//! One publishing run: fetch, normalize, validate, rewrite, publish.
//!
//! Every stage must succeed before anything is uploaded, so a failed run
//! leaves the previously published artifact untouched.

use futures::stream::{self, StreamExt};
use thiserror::Error;
use toppages_analytics::{
    normalize_rows, AnalyticsClient, AnalyticsError, ReportRequest, ServiceAccountKey,
};
use toppages_core::{CheckFailurePolicy, PageRecord, PipelineConfig};
use toppages_site::{rewrite_search_titles, PageCheck, SiteChecker, SiteError};
use toppages_storage::{publish_artifact, S3Client, StorageError};

#[derive(Debug, Error)]
pub(crate) enum PipelineError {
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Site(#[from] SiteError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("could not check {url}: {reason}")]
    CheckFailed { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PipelineOutcome {
    pub published: Vec<PageRecord>,
    pub invalid: Vec<PageRecord>,
    pub bucket_created: bool,
    pub bytes: usize,
}

/// The three remote services a run talks to.
pub(crate) struct Clients {
    pub analytics: AnalyticsClient,
    pub checker: SiteChecker,
    pub storage: S3Client,
}

impl Clients {
    /// Loads the service-account key, obtains an analytics access token, and
    /// builds the site and storage clients.
    pub(crate) async fn connect(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let key = ServiceAccountKey::load(&config.credentials)?;
        tracing::info!(client_email = %key.client_email, "connecting to analytics reporting API");
        let analytics = AnalyticsClient::connect(
            &key,
            Some(config.ga_base_url.as_str()),
            config.request_timeout_secs,
            &config.user_agent,
        )
        .await?;

        let checker = SiteChecker::new(
            &config.site_origin,
            &config.strip_path_prefix,
            config.request_timeout_secs,
            &config.user_agent,
        )?;

        let storage = S3Client::new(&config.s3, config.request_timeout_secs, &config.user_agent)?;

        Ok(Self {
            analytics,
            checker,
            storage,
        })
    }
}

pub(crate) async fn run_pipeline(
    config: &PipelineConfig,
    clients: &Clients,
    days: &str,
) -> Result<PipelineOutcome, PipelineError> {
    let request = ReportRequest::top_pages(&config.ga_view_id, days, config.candidate_count);
    tracing::info!(view_id = %config.ga_view_id, days, "requesting most visited pages");
    let rows = clients.analytics.fetch_report(&request).await?;
    for row in &rows {
        tracing::debug!(dimensions = ?row.dimensions, pageviews = ?row.pageviews(), "report row");
    }
    let candidates = normalize_rows(rows, &config.title_suffix())?;
    tracing::info!(candidates = candidates.len(), "received candidate pages");

    let (mut valid, invalid) = validate_pages(
        &clients.checker,
        candidates,
        config.validate_concurrency,
        config.check_failure_policy,
    )
    .await?;

    rewrite_search_titles(&mut valid, &config.search_title_template);
    valid.truncate(config.publish_count);

    for record in &valid {
        tracing::info!(url = %record.url, title = %record.title, "top page");
    }

    let report = publish_artifact(
        &clients.storage,
        &config.s3.bucket_name,
        &config.s3.object_key,
        &valid,
    )
    .await?;

    Ok(PipelineOutcome {
        published: valid,
        invalid,
        bucket_created: report.bucket_created,
        bytes: report.bytes,
    })
}

/// Checks every candidate and splits them into `(valid, invalid)`, both in
/// report order. `concurrency` bounds the requests in flight.
async fn validate_pages(
    checker: &SiteChecker,
    candidates: Vec<PageRecord>,
    concurrency: usize,
    policy: CheckFailurePolicy,
) -> Result<(Vec<PageRecord>, Vec<PageRecord>), PipelineError> {
    let results: Vec<(PageRecord, PageCheck)> = stream::iter(candidates)
        .map(|record| async move {
            let check = checker.check(&record).await;
            (record, check)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut valid = Vec::with_capacity(results.len());
    let mut invalid = Vec::new();
    for (record, check) in results {
        match check {
            PageCheck::Valid => valid.push(record),
            PageCheck::Invalid { status } => {
                tracing::info!(url = %record.url, status, "excluding page that is no longer live");
                invalid.push(record);
            }
            PageCheck::CheckFailed { reason } => match policy {
                CheckFailurePolicy::Abort => {
                    return Err(PipelineError::CheckFailed {
                        url: record.url,
                        reason,
                    });
                }
                CheckFailurePolicy::TreatAsInvalid => {
                    tracing::warn!(
                        url = %record.url,
                        reason = %reason,
                        "page check failed; treating as invalid"
                    );
                    invalid.push(record);
                }
            },
        }
    }

    Ok((valid, invalid))
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
