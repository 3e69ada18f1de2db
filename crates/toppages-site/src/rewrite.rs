//! Title rewriting for internal search-result pages.
//!
//! Analytics records every search page under the same generic title, which
//! makes them indistinguishable in the published list. Pages whose URL
//! carries a `q` parameter get a title built from the search term instead.

use toppages_core::PageRecord;

/// Placeholder in the title template that receives the search term.
pub const SEARCH_TERM_PLACEHOLDER: &str = "{q}";

/// First non-blank `q` value in the query string of `page_url`, decoded.
///
/// Works on bare paths (`/search?q=x`) as well as absolute URLs. Blank values
/// (`q=`) are skipped.
#[must_use]
pub fn search_term(page_url: &str) -> Option<String> {
    let without_fragment = page_url.split_once('#').map_or(page_url, |(head, _)| head);
    let (_, query) = without_fragment.split_once('?')?;

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == "q" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Replaces `record.title` with `template` filled with the search term, when
/// the URL has one. Returns whether the title was rewritten.
pub fn rewrite_search_title(record: &mut PageRecord, template: &str) -> bool {
    let Some(term) = search_term(&record.url) else {
        return false;
    };
    record.title = template.replace(SEARCH_TERM_PLACEHOLDER, &term);
    true
}

/// Applies [`rewrite_search_title`] to every record in place.
pub fn rewrite_search_titles(records: &mut [PageRecord], template: &str) {
    for record in records.iter_mut() {
        if rewrite_search_title(record, template) {
            tracing::debug!(url = %record.url, title = %record.title, "rewrote search page title");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "Search results for \"{q}\"";

    #[test]
    fn search_term_reads_q_from_path() {
        assert_eq!(search_term("/search?q=parole"), Some("parole".to_string()));
    }

    #[test]
    fn search_term_decodes_plus_and_percent() {
        assert_eq!(
            search_term("/search?q=expunge+record%20help"),
            Some("expunge record help".to_string())
        );
    }

    #[test]
    fn search_term_takes_first_value() {
        assert_eq!(
            search_term("/search?q=first&q=second"),
            Some("first".to_string())
        );
    }

    #[test]
    fn search_term_skips_blank_values() {
        assert_eq!(search_term("/search?q=&q=housing"), Some("housing".to_string()));
        assert_eq!(search_term("/search?q="), None);
    }

    #[test]
    fn search_term_absent_without_query() {
        assert_eq!(search_term("/search"), None);
        assert_eq!(search_term("/search?page=2"), None);
    }

    #[test]
    fn search_term_ignores_fragment() {
        assert_eq!(search_term("/search?q=id#results"), Some("id".to_string()));
        assert_eq!(search_term("/faq#q=nope"), None);
    }

    #[test]
    fn search_term_does_not_match_similar_keys() {
        assert_eq!(search_term("/search?query=x&qq=y"), None);
    }

    #[test]
    fn rewrite_replaces_any_prior_title() {
        let mut record = PageRecord::new("/search?q=parole", "Whatever was here");
        assert!(rewrite_search_title(&mut record, TEMPLATE));
        assert_eq!(record.title, "Search results for \"parole\"");
    }

    #[test]
    fn rewrite_leaves_pages_without_q_unchanged() {
        let mut record = PageRecord::new("/housing?page=2", "Housing");
        assert!(!rewrite_search_title(&mut record, TEMPLATE));
        assert_eq!(record.title, "Housing");
    }

    #[test]
    fn rewrite_is_idempotent() {
        let mut record = PageRecord::new("/search?q=voting", "Search results");
        rewrite_search_title(&mut record, TEMPLATE);
        let once = record.clone();
        rewrite_search_title(&mut record, TEMPLATE);
        assert_eq!(record, once);
    }

    #[test]
    fn rewrite_search_titles_touches_only_search_pages() {
        let mut records = vec![
            PageRecord::new("/", "Home"),
            PageRecord::new("/search?q=id", "Search results"),
        ];
        rewrite_search_titles(&mut records, TEMPLATE);
        assert_eq!(records[0].title, "Home");
        assert_eq!(records[1].title, "Search results for \"id\"");
    }
}
