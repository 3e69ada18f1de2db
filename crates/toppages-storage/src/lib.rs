//! Minimal S3 client and the artifact publisher built on it.
//!
//! Speaks the S3 REST API directly over `reqwest` with path-style addressing
//! and Signature Version 4, so it works against AWS and S3-compatible stores
//! alike. Only the four calls the publisher needs are implemented.

pub mod client;
pub mod error;
pub mod publish;

mod sigv4;
mod types;

pub use client::{AwsCredentials, S3Client};
pub use error::StorageError;
pub use publish::{publish_artifact, PublishReport};
