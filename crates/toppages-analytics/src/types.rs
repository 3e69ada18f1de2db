//! Request and response shapes for `reports:batchGet`.

use serde::{Deserialize, Serialize};

/// One report request in a `reports:batchGet` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub view_id: String,
    pub date_ranges: Vec<DateRange>,
    pub metrics: Vec<Metric>,
    pub dimensions: Vec<Dimension>,
    pub order_bys: Vec<OrderBy>,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field_name: String,
    pub sort_order: String,
}

impl ReportRequest {
    /// Most-viewed pages over the last `days` days, by descending pageviews.
    ///
    /// `days` is passed through as-is into `"{days}daysAgo"`; the reporting
    /// API is the one that rejects a value it cannot interpret.
    #[must_use]
    pub fn top_pages(view_id: &str, days: &str, page_size: u32) -> Self {
        Self {
            view_id: view_id.to_string(),
            date_ranges: vec![DateRange {
                start_date: format!("{days}daysAgo"),
                end_date: "today".to_string(),
            }],
            metrics: vec![
                Metric {
                    expression: "ga:pageviews".to_string(),
                },
                Metric {
                    expression: "ga:uniquePageviews".to_string(),
                },
            ],
            dimensions: vec![
                Dimension {
                    name: "ga:pageTitle".to_string(),
                },
                Dimension {
                    name: "ga:pagePath".to_string(),
                },
            ],
            order_bys: vec![OrderBy {
                field_name: "ga:pageviews".to_string(),
                sort_order: "DESCENDING".to_string(),
            }],
            page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchGetRequest<'a> {
    pub(crate) report_requests: [&'a ReportRequest; 1],
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchGetResponse {
    #[serde(default)]
    pub(crate) reports: Vec<Report>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Report {
    #[serde(default)]
    pub(crate) data: ReportData,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportData {
    #[serde(default)]
    pub(crate) rows: Vec<ReportRow>,
}

/// One row of a report: dimension values in request order plus metric values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportRow {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<DateRangeValues>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DateRangeValues {
    #[serde(default)]
    pub values: Vec<String>,
}

impl ReportRow {
    /// Convenience constructor used by callers that fabricate rows.
    #[must_use]
    pub fn from_dimensions(title: &str, path: &str) -> Self {
        Self {
            dimensions: vec![title.to_string(), path.to_string()],
            metrics: Vec::new(),
        }
    }

    /// First metric value of the first date range (pageviews), if present.
    #[must_use]
    pub fn pageviews(&self) -> Option<u64> {
        self.metrics
            .first()
            .and_then(|m| m.values.first())
            .and_then(|v| v.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_pages_request_serializes_to_reporting_shape() {
        let request = ReportRequest::top_pages("154632053", "30", 20);
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "viewId": "154632053",
                "dateRanges": [{"startDate": "30daysAgo", "endDate": "today"}],
                "metrics": [
                    {"expression": "ga:pageviews"},
                    {"expression": "ga:uniquePageviews"}
                ],
                "dimensions": [
                    {"name": "ga:pageTitle"},
                    {"name": "ga:pagePath"}
                ],
                "orderBys": [{"fieldName": "ga:pageviews", "sortOrder": "DESCENDING"}],
                "pageSize": 20
            })
        );
    }

    #[test]
    fn top_pages_passes_day_count_through_unvalidated() {
        let request = ReportRequest::top_pages("1", "abc", 20);
        assert_eq!(request.date_ranges[0].start_date, "abcdaysAgo");
    }

    #[test]
    fn response_without_rows_yields_empty_data() {
        let body = r#"{"reports":[{"columnHeader":{},"data":{"totals":[{"values":["0","0"]}]}}]}"#;
        let parsed: BatchGetResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(parsed.reports.len(), 1);
        assert!(parsed.reports[0].data.rows.is_empty());
    }

    #[test]
    fn report_row_pageviews_reads_first_metric() {
        let row: ReportRow = serde_json::from_str(
            r#"{"dimensions":["Home","/"],"metrics":[{"values":["120","95"]}]}"#,
        )
        .expect("parse");
        assert_eq!(row.pageviews(), Some(120));
    }
}
