//! XML documents exchanged with S3.

use serde::Deserialize;

/// Body of `GET /` (`ListBuckets`).
#[derive(Debug, Deserialize)]
pub(crate) struct ListAllMyBucketsResult {
    #[serde(rename = "Buckets", default)]
    pub(crate) buckets: Buckets,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Buckets {
    #[serde(rename = "Bucket", default)]
    pub(crate) bucket: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Bucket {
    #[serde(rename = "Name")]
    pub(crate) name: String,
}

pub(crate) const S3_XMLNS: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Body of `PUT /{bucket}` outside `us-east-1`, where S3 rejects a create
/// request that does not name the region.
pub(crate) fn create_bucket_configuration(region: &str) -> String {
    format!(
        "<CreateBucketConfiguration xmlns=\"{S3_XMLNS}\">\
         <LocationConstraint>{region}</LocationConstraint>\
         </CreateBucketConfiguration>"
    )
}
