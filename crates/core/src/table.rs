//! The list-view fetch contract.
//!
//! Every admin and vendor list screen sends the same request shape
//! (`pageIndex`, `pageSize`, `sorting`, `columnFilters`, `globalFilter`) and
//! receives `{rows, pageCount, total}`. Field names are UI names; mapping them
//! to storage columns is the server's business, and names it does not know
//! are ignored rather than rejected.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page size used when the request omits `pageSize`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Errors for requests that cannot describe a bounded page.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TableRequestError {
    #[error("pageSize must be greater than zero")]
    ZeroPageSize,
    #[error("pageSize must be at most {max} (got {requested})")]
    PageSizeTooLarge { max: u32, requested: u32 },
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// One entry of the `sorting` list: a UI field and whether it sorts descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub id: String,
    #[serde(default)]
    pub desc: bool,
}

impl SortSpec {
    #[must_use]
    pub fn asc(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            desc: false,
        }
    }

    #[must_use]
    pub fn desc(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            desc: true,
        }
    }

    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// One entry of the `columnFilters` list.
///
/// The value stays untyped JSON here; the server coerces it according to the
/// kind of filter registered for `id` (text, boolean, id, range, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: Value,
}

/// A list request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Zero-based page index.
    #[serde(default)]
    pub page_index: u32,
    /// Rows per page, `1..=MAX_PAGE_SIZE`.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Ordered sort keys; earlier entries take precedence.
    #[serde(default)]
    pub sorting: Vec<SortSpec>,
    /// Per-column filters, combined with AND.
    #[serde(default)]
    pub column_filters: Vec<ColumnFilter>,
    /// Free-text search across the entity's searchable columns.
    #[serde(default)]
    pub global_filter: Option<String>,
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sorting: Vec::new(),
            column_filters: Vec::new(),
            global_filter: None,
        }
    }
}

/// `LIMIT` / `OFFSET` derived from a validated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u32,
    pub offset: u64,
}

impl FetchRequest {
    /// Set the page.
    #[must_use]
    pub const fn page(mut self, page_index: u32, page_size: u32) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }

    /// Append a sort key.
    #[must_use]
    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sorting.push(spec);
        self
    }

    /// Append a column filter.
    #[must_use]
    pub fn filter(mut self, id: &str, value: impl Into<Value>) -> Self {
        self.column_filters.push(ColumnFilter {
            id: id.to_owned(),
            value: value.into(),
        });
        self
    }

    /// Set the global search text.
    #[must_use]
    pub fn search(mut self, text: &str) -> Self {
        self.global_filter = Some(text.to_owned());
        self
    }

    /// Validate the page size and compute the row window.
    ///
    /// # Errors
    ///
    /// Returns [`TableRequestError`] when `page_size` is zero or above
    /// [`MAX_PAGE_SIZE`].
    pub const fn window(&self) -> Result<PageWindow, TableRequestError> {
        if self.page_size == 0 {
            return Err(TableRequestError::ZeroPageSize);
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(TableRequestError::PageSizeTooLarge {
                max: MAX_PAGE_SIZE,
                requested: self.page_size,
            });
        }
        Ok(PageWindow {
            limit: self.page_size,
            offset: self.page_index as u64 * self.page_size as u64,
        })
    }

    /// The trimmed global filter, if it has any content.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.global_filter
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Number of pages needed to show `total` rows at `page_size` rows per page.
///
/// A zero page size yields zero pages rather than dividing by zero.
#[must_use]
pub const fn page_count(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64)
}

/// A list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse<T> {
    pub rows: Vec<T>,
    pub page_count: u64,
    pub total: u64,
}

impl<T> FetchResponse<T> {
    /// Build a response, deriving `page_count` from `total` and `page_size`.
    #[must_use]
    pub fn new(rows: Vec<T>, total: u64, page_size: u32) -> Self {
        Self {
            rows,
            page_count: page_count(total, page_size),
            total,
        }
    }

    /// Transform every row, keeping the counts.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> FetchResponse<U> {
        FetchResponse {
            rows: self.rows.into_iter().map(f).collect(),
            page_count: self.page_count,
            total: self.total,
        }
    }

    /// Fallible [`map`](Self::map); stops at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<FetchResponse<U>, E> {
        Ok(FetchResponse {
            rows: self.rows.into_iter().map(f).collect::<Result<_, E>>()?,
            page_count: self.page_count,
            total: self.total,
        })
    }
}

/// The kind of write a row (or the table) is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// Which rows currently have a create, update or delete in flight.
///
/// Only used to disable buttons and show spinners; it never affects data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutationState {
    pub creating: bool,
    pub updating: BTreeSet<i32>,
    pub deleting: BTreeSet<i32>,
}

impl MutationState {
    /// Record the start of a mutation. `row_id` is ignored for creates.
    pub fn begin(&mut self, kind: MutationKind, row_id: Option<i32>) {
        match (kind, row_id) {
            (MutationKind::Create, _) => self.creating = true,
            (MutationKind::Update, Some(id)) => {
                self.updating.insert(id);
            }
            (MutationKind::Delete, Some(id)) => {
                self.deleting.insert(id);
            }
            (_, None) => {}
        }
    }

    /// Record the end (success or failure) of a mutation.
    pub fn finish(&mut self, kind: MutationKind, row_id: Option<i32>) {
        match (kind, row_id) {
            (MutationKind::Create, _) => self.creating = false,
            (MutationKind::Update, Some(id)) => {
                self.updating.remove(&id);
            }
            (MutationKind::Delete, Some(id)) => {
                self.deleting.remove(&id);
            }
            (_, None) => {}
        }
    }

    #[must_use]
    pub fn is_updating(&self, row_id: i32) -> bool {
        self.updating.contains(&row_id)
    }

    #[must_use]
    pub fn is_deleting(&self, row_id: i32) -> bool {
        self.deleting.contains(&row_id)
    }

    /// Whether the row has any write in flight.
    #[must_use]
    pub fn is_busy(&self, row_id: i32) -> bool {
        self.is_updating(row_id) || self.is_deleting(row_id)
    }

    /// Whether nothing at all is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.creating && self.updating.is_empty() && self.deleting.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(95, 20), 5);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn test_page_count_matches_ceil_division() {
        for total in 0..300_u64 {
            for size in 1..=25_u32 {
                let expected = (total + u64::from(size) - 1) / u64::from(size);
                assert_eq!(page_count(total, size), expected, "{total}/{size}");
            }
        }
    }

    #[test]
    fn test_request_defaults_from_empty_json() {
        let request: FetchRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request, FetchRequest::default());
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_request_wire_format_is_camel_case() {
        let request: FetchRequest = serde_json::from_value(json!({
            "pageIndex": 2,
            "pageSize": 25,
            "sorting": [{"id": "createdAt", "desc": true}, {"id": "name"}],
            "columnFilters": [{"id": "isActive", "value": "true"}],
            "globalFilter": "  shoes "
        }))
        .unwrap();

        assert_eq!(request.page_index, 2);
        assert_eq!(request.sorting[0], SortSpec::desc("createdAt"));
        assert_eq!(request.sorting[1].direction(), SortDirection::Asc);
        assert_eq!(request.column_filters[0].value, json!("true"));
        assert_eq!(request.search_term(), Some("shoes"));
    }

    #[test]
    fn test_window() {
        let window = FetchRequest::default().page(3, 20).window().unwrap();
        assert_eq!(window, PageWindow { limit: 20, offset: 60 });

        assert_eq!(
            FetchRequest::default().page(0, 0).window(),
            Err(TableRequestError::ZeroPageSize)
        );
        assert_eq!(
            FetchRequest::default().page(0, 101).window(),
            Err(TableRequestError::PageSizeTooLarge {
                max: 100,
                requested: 101
            })
        );
    }

    #[test]
    fn test_window_does_not_overflow() {
        let window = FetchRequest::default()
            .page(u32::MAX, MAX_PAGE_SIZE)
            .window()
            .unwrap();
        assert_eq!(window.offset, u64::from(u32::MAX) * 100);
    }

    #[test]
    fn test_blank_search_term_is_none() {
        assert_eq!(FetchRequest::default().search("   ").search_term(), None);
        assert_eq!(FetchRequest::default().search_term(), None);
    }

    #[test]
    fn test_response_serializes_counts() {
        let response = FetchResponse::new(vec![1, 2, 3], 23, 3);
        assert_eq!(response.page_count, 8);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"rows": [1, 2, 3], "pageCount": 8, "total": 23}));
    }

    #[test]
    fn test_response_map_keeps_counts() {
        let response = FetchResponse::new(vec![1, 2], 2, 10).map(|n| n * 10);
        assert_eq!(response.rows, vec![10, 20]);
        assert_eq!(response.total, 2);
        assert_eq!(response.page_count, 1);
    }

    #[test]
    fn test_mutation_state_lifecycle() {
        let mut state = MutationState::default();
        assert!(state.is_idle());

        state.begin(MutationKind::Update, Some(4));
        state.begin(MutationKind::Delete, Some(9));
        state.begin(MutationKind::Create, None);
        assert!(state.is_updating(4));
        assert!(state.is_deleting(9));
        assert!(state.is_busy(4) && state.is_busy(9));
        assert!(!state.is_busy(5));

        state.finish(MutationKind::Update, Some(4));
        state.finish(MutationKind::Delete, Some(9));
        state.finish(MutationKind::Create, None);
        assert!(state.is_idle());
    }

    #[test]
    fn test_mutation_state_from_partial_json() {
        let state: MutationState = serde_json::from_value(json!({"deleting": [3]})).unwrap();
        assert!(!state.creating);
        assert!(state.is_deleting(3));
    }
}
