//! Single and multi-page table fetches.

use isskit_types::TypedTable;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{FetchError, IssSource, RawTable, cast_columns, parse::take_table, url::render};

/// How a paged fetch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// Paging stopped on an empty page.
    Complete,
    /// Paging stopped after too many consecutive failures; rows fetched
    /// before that are kept.
    Partial {
        /// Consecutive failures at the point paging stopped.
        failures: u32,
        /// The last error seen.
        last_error: String,
    },
}

/// Result of a paged fetch.
#[derive(Debug, Clone)]
pub struct PagedTable {
    /// Concatenated rows; columns and metadata from the first page.
    pub table: RawTable,
    /// Whether every page was retrieved.
    pub status: PageStatus,
}

impl PagedTable {
    /// Returns true if paging ended on an empty page.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.status, PageStatus::Complete)
    }

    /// Casts the table, keeping the status.
    #[must_use]
    pub fn into_typed(self) -> (TypedTable, PageStatus) {
        (cast_columns(self.table), self.status)
    }
}

fn table_params(tables: &str, query: &[(String, String)], unlimited: bool) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(query.len() + 4);
    params.push(("iss.meta".to_string(), "on".to_string()));
    params.push(("iss.only".to_string(), tables.to_string()));
    if unlimited {
        params.push(("limit".to_string(), "unlimited".to_string()));
    }
    params.extend(query.iter().cloned());
    params
}

/// Fetches a document restricted to the given sub-tables.
///
/// Used when one response carries several tables that are read together.
///
/// # Errors
///
/// Returns an error on transport failure or an unresolved template variable.
pub async fn fetch_document<S: IssSource + ?Sized>(
    source: &S,
    template: &str,
    vars: &[(&str, String)],
    tables: &[&str],
    query: &[(String, String)],
) -> Result<Value, FetchError> {
    let path = render(template, vars)?;
    let params = table_params(&tables.join(","), query, true);
    source.get_json(&path, &params).await
}

/// Fetches one sub-table in a single request.
///
/// # Errors
///
/// Returns an error on transport failure, or [`FetchError::MissingTable`] if
/// the response lacks the table.
pub async fn fetch_table<S: IssSource + ?Sized>(
    source: &S,
    template: &str,
    vars: &[(&str, String)],
    table: &str,
    query: &[(String, String)],
) -> Result<RawTable, FetchError> {
    let mut doc = fetch_document(source, template, vars, &[table], query).await?;
    let raw = take_table(&mut doc, table)?;
    debug!(table, rows = raw.len(), "Fetched table");
    Ok(raw)
}

/// Fetches one sub-table and casts it.
///
/// # Errors
///
/// Same as [`fetch_table`].
pub async fn fetch_typed<S: IssSource + ?Sized>(
    source: &S,
    template: &str,
    vars: &[(&str, String)],
    table: &str,
    query: &[(String, String)],
) -> Result<TypedTable, FetchError> {
    fetch_table(source, template, vars, table, query)
        .await
        .map(cast_columns)
}

/// Fetches a sub-table page by page until an empty page.
///
/// A failed page is retried at the same offset. After
/// [`Paging::max_consecutive_failures`](crate::Paging) failures in a row the
/// rows collected so far are returned with [`PageStatus::Partial`].
///
/// # Errors
///
/// Returns the last error if no page could be fetched at all, or an
/// unresolved template variable.
pub async fn fetch_paged<S: IssSource + ?Sized>(
    source: &S,
    template: &str,
    vars: &[(&str, String)],
    table: &str,
    query: &[(String, String)],
) -> Result<PagedTable, FetchError> {
    let path = render(template, vars)?;
    let paging = source.paging();

    let mut merged: Option<RawTable> = None;
    let mut start = 0usize;
    let mut failures = 0u32;
    let mut last_error: Option<FetchError> = None;

    loop {
        let mut params = table_params(table, query, false);
        params.push(("start".to_string(), start.to_string()));

        let page = match source.get_json(&path, &params).await {
            Ok(mut doc) => take_table(&mut doc, table),
            Err(e) => Err(e),
        };

        let page = match page {
            Ok(page) => page,
            Err(e) => {
                failures += 1;
                warn!(table, start, failures, error = %e, "Page fetch failed");
                last_error = Some(e);
                if failures >= paging.max_consecutive_failures {
                    break;
                }
                continue;
            }
        };

        failures = 0;
        debug!(table, start, rows = page.len(), "Fetched page");

        if page.is_empty() {
            merged.get_or_insert(page);
            break;
        }
        match merged.as_mut() {
            Some(acc) => acc.rows.extend(page.rows),
            None => merged = Some(page),
        }
        start += paging.page_size;
    }

    let status = if failures == 0 {
        PageStatus::Complete
    } else {
        PageStatus::Partial {
            failures,
            last_error: last_error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    };

    match (merged, last_error) {
        (Some(table), _) => Ok(PagedTable { table, status }),
        (None, Some(e)) => Err(e),
        (None, None) => Err(FetchError::MissingTable(table.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Paging;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves `total` rows of a `history` table in pages of 100, failing
    /// the next `fail_times` requests at offset `fail_at`.
    struct SeriesSource {
        total: usize,
        fail_at: usize,
        fail_times: Mutex<u32>,
        calls: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl SeriesSource {
        fn new(total: usize) -> Self {
            Self::failing(total, usize::MAX, 0)
        }

        fn failing(total: usize, fail_at: usize, fail_times: u32) -> Self {
            Self {
                total,
                fail_at,
                fail_times: Mutex::new(fail_times),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl IssSource for SeriesSource {
        async fn get_json(
            &self,
            _path: &str,
            query: &[(String, String)],
        ) -> Result<Value, FetchError> {
            self.calls.lock().unwrap().push(query.to_vec());
            let start: usize = query
                .iter()
                .find(|(k, _)| k == "start")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(0);

            if start == self.fail_at {
                let mut left = self.fail_times.lock().unwrap();
                if *left > 0 {
                    *left -= 1;
                    return Err(FetchError::Status {
                        status: 503,
                        url: "fake".into(),
                    });
                }
            }

            let end = (start + 100).min(self.total);
            let data: Vec<Value> = (start.min(end)..end).map(|i| json!([i, "2024-01-01"])).collect();
            Ok(json!({
                "history": {
                    "metadata": {"N": {"type": "int32"}, "TRADEDATE": {"type": "date"}},
                    "columns": ["N", "TRADEDATE"],
                    "data": data
                }
            }))
        }
    }

    #[tokio::test]
    async fn test_fetch_paged_concatenates_in_order() {
        let source = SeriesSource::new(250);
        let paged = fetch_paged(&source, "/history.json", &[], "history", &[])
            .await
            .unwrap();

        assert!(paged.is_complete());
        assert_eq!(paged.table.len(), 250);
        let numbers: Vec<i64> = paged
            .table
            .rows
            .iter()
            .map(|row| row[0].as_i64().unwrap())
            .collect();
        assert_eq!(numbers, (0..250).collect::<Vec<_>>());
        // 0, 100, 200, 300 (empty)
        assert_eq!(source.call_count(), 4);
    }

    #[tokio::test]
    async fn test_fetch_paged_retries_same_offset() {
        let source = SeriesSource::failing(250, 100, 2);
        let paged = fetch_paged(&source, "/history.json", &[], "history", &[])
            .await
            .unwrap();

        assert!(paged.is_complete());
        assert_eq!(paged.table.len(), 250);
        assert_eq!(source.call_count(), 6);
    }

    #[tokio::test]
    async fn test_fetch_paged_failure_cap_is_partial() {
        let source = SeriesSource::failing(250, 100, u32::MAX);
        let paged = fetch_paged(&source, "/history.json", &[], "history", &[])
            .await
            .unwrap();

        assert_eq!(paged.table.len(), 100);
        match &paged.status {
            PageStatus::Partial { failures, last_error } => {
                assert_eq!(*failures, Paging::default().max_consecutive_failures);
                assert!(last_error.contains("503"));
            }
            PageStatus::Complete => panic!("expected partial status"),
        }
        assert_eq!(source.call_count(), 6);
    }

    #[tokio::test]
    async fn test_fetch_paged_no_page_is_error() {
        let source = SeriesSource::failing(250, 0, u32::MAX);
        let result = fetch_paged(&source, "/history.json", &[], "history", &[]).await;
        assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_fetch_paged_empty_keeps_columns() {
        let source = SeriesSource::new(0);
        let paged = fetch_paged(&source, "/history.json", &[], "history", &[])
            .await
            .unwrap();

        assert!(paged.is_complete());
        assert!(paged.table.is_empty());
        assert_eq!(paged.table.columns, vec!["N", "TRADEDATE"]);

        let (typed, _) = paged.into_typed();
        assert!(typed.has_column("tradedate"));
    }

    #[tokio::test]
    async fn test_fetch_table_sends_table_params() {
        let source = SeriesSource::new(3);
        let query = vec![("from".to_string(), "2024-01-01".to_string())];
        let typed = fetch_typed(&source, "/history.json", &[], "history", &query)
            .await
            .unwrap();
        assert_eq!(typed.len(), 3);

        let calls = source.calls.lock().unwrap();
        let sent = &calls[0];
        assert!(sent.contains(&("iss.meta".into(), "on".into())));
        assert!(sent.contains(&("iss.only".into(), "history".into())));
        assert!(sent.contains(&("limit".into(), "unlimited".into())));
        assert!(sent.contains(&("from".into(), "2024-01-01".into())));
    }

    #[tokio::test]
    async fn test_fetch_table_missing() {
        let source = SeriesSource::new(3);
        let err = fetch_table(&source, "/history.json", &[], "coupons", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingTable(_)));
    }
}
