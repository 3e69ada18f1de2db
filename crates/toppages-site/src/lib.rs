//! Checks candidate pages against the live site and rewrites search-page
//! titles.

pub mod checker;
pub mod error;
pub mod rewrite;

pub use checker::{PageCheck, SiteChecker};
pub use error::SiteError;
pub use rewrite::{rewrite_search_title, rewrite_search_titles, search_term};
