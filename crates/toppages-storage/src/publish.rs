//! Publishing the top-pages artifact.

use toppages_core::PageRecord;

use crate::client::S3Client;
use crate::error::StorageError;

const CONTENT_TYPE: &str = "application/json";
const PUBLIC_READ: &str = "public-read";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub bucket_created: bool,
    pub bytes: usize,
}

/// Writes `records` as a JSON array to `bucket/key` and makes it public.
///
/// Ensures the bucket, uploads, then applies the `public-read` ACL. The three
/// calls are not atomic: a failure after the upload leaves the new object in
/// place with its previous permissions.
///
/// # Errors
///
/// Returns the first [`StorageError`] encountered; later steps are skipped.
pub async fn publish_artifact(
    client: &S3Client,
    bucket: &str,
    key: &str,
    records: &[PageRecord],
) -> Result<PublishReport, StorageError> {
    let bucket_created = client.ensure_bucket(bucket).await?;

    let body = serde_json::to_vec(records)?;
    let bytes = body.len();

    tracing::info!(bucket, key, records = records.len(), bytes, "uploading artifact");
    client.put_object(bucket, key, body, CONTENT_TYPE).await?;

    tracing::info!(bucket, key, acl = PUBLIC_READ, "granting public read access");
    client.put_object_acl(bucket, key, PUBLIC_READ).await?;

    Ok(PublishReport {
        bucket_created,
        bytes,
    })
}
