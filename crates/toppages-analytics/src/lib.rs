//! Google Analytics Reporting API v4 access for the top-pages publisher.
//!
//! Loads a service-account key, exchanges it for an access token, requests the
//! most-viewed pages over a trailing window, and turns report rows into
//! [`toppages_core::PageRecord`]s.

pub mod client;
pub mod credentials;
pub mod error;
pub mod normalize;
pub mod types;

mod auth;

pub use client::AnalyticsClient;
pub use credentials::ServiceAccountKey;
pub use error::AnalyticsError;
pub use normalize::{normalize_row, normalize_rows, strip_title_suffix};
pub use types::{ReportRequest, ReportRow};
