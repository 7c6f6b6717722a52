//! Generic list fetcher.
//!
//! Turns a [`FetchRequest`] into one bounded `SELECT` and one `COUNT(*)` over
//! the same predicate. Each entity registers a [`ListSpec`]: the select list,
//! the `FROM` clause, and static maps from UI field names to storage columns.
//! Only column names from those maps are ever spliced into SQL; every value
//! is a bound parameter. Unknown fields, and values that do not coerce to
//! the registered filter kind, are dropped.

use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use bazaar_core::{FetchRequest, FetchResponse, PageWindow, ShopId, SortDirection, VendorId};

use super::RepositoryError;

/// How a column filter value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring match.
    Text,
    /// `true`/`false`, as JSON booleans or strings.
    Boolean,
    /// Equality on the column's text form (enums).
    Exact,
    /// Membership in a list of text values.
    OneOf,
    /// Equality on an integer key.
    Id,
    /// `{from, to}` ISO dates, both inclusive.
    DateRange,
    /// `{min, max}` decimals, both inclusive.
    NumberRange,
}

/// A filter value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// An escaped `ILIKE` pattern.
    Text(String),
    Boolean(bool),
    Exact(String),
    OneOf(Vec<String>),
    Id(i32),
    /// Half-open `[from, until)` in UTC.
    DateRange {
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    },
    NumberRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
}

impl FilterKind {
    /// Coerce a raw JSON value, or `None` if it has no meaning for this kind.
    #[must_use]
    pub fn coerce(self, value: &Value) -> Option<FilterValue> {
        match self {
            Self::Text => scalar_text(value).map(|s| FilterValue::Text(like_pattern(&s))),
            Self::Boolean => coerce_bool(value).map(FilterValue::Boolean),
            Self::Exact => scalar_text(value).map(FilterValue::Exact),
            Self::OneOf => {
                let values: Vec<String> = match value {
                    Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
                    other => scalar_text(other).into_iter().collect(),
                };
                (!values.is_empty()).then_some(FilterValue::OneOf(values))
            }
            Self::Id => coerce_id(value).map(FilterValue::Id),
            Self::DateRange => {
                let (from, to) = range_bounds(value);
                let from = from.as_ref().and_then(parse_date).map(start_of_day);
                let until = to
                    .as_ref()
                    .and_then(parse_date)
                    .and_then(|d| d.checked_add_days(Days::new(1)))
                    .map(start_of_day);
                (from.is_some() || until.is_some()).then_some(FilterValue::DateRange { from, until })
            }
            Self::NumberRange => {
                let (min, max) = range_bounds(value);
                let min = min.as_ref().and_then(parse_decimal);
                let max = max.as_ref().and_then(parse_decimal);
                (min.is_some() || max.is_some()).then_some(FilterValue::NumberRange { min, max })
            }
        }
    }
}

/// Trimmed, non-empty text from a string or number.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Lower and upper bound from `{from, to}`, `{min, max}` or `[lo, hi]`.
fn range_bounds(value: &Value) -> (Option<Value>, Option<Value>) {
    let pick = |v: Option<&Value>| v.filter(|v| !v.is_null()).cloned();
    match value {
        Value::Object(map) => (
            pick(map.get("from").or_else(|| map.get("min"))),
            pick(map.get("to").or_else(|| map.get("max"))),
        ),
        Value::Array(items) => (pick(items.first()), pick(items.get(1))),
        _ => (None, None),
    }
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    // Accept a full timestamp by keeping its date part.
    let date = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    scalar_text(value).and_then(|s| Decimal::from_str(&s).ok())
}

/// `%text%` with `\`, `%` and `_` escaped for `ILIKE`.
#[must_use]
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// A sortable UI field.
#[derive(Debug, Clone, Copy)]
pub struct SortField {
    pub key: &'static str,
    pub column: &'static str,
}

impl SortField {
    #[must_use]
    pub const fn new(key: &'static str, column: &'static str) -> Self {
        Self { key, column }
    }
}

/// A filterable UI field.
#[derive(Debug, Clone, Copy)]
pub struct FilterField {
    pub key: &'static str,
    pub column: &'static str,
    pub kind: FilterKind,
}

impl FilterField {
    #[must_use]
    pub const fn new(key: &'static str, column: &'static str, kind: FilterKind) -> Self {
        Self { key, column, kind }
    }
}

/// Static description of one entity's list query.
#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    /// Entity name, for logs.
    pub entity: &'static str,
    /// Select list, e.g. `b.id, b.name, s.name AS shop_name`.
    pub select: &'static str,
    /// `FROM` clause including joins.
    pub from: &'static str,
    /// Primary key column, appended as the final tie-breaker.
    pub key_column: &'static str,
    pub sort_fields: &'static [SortField],
    pub filter_fields: &'static [FilterField],
    /// Columns matched by the global filter.
    pub search_columns: &'static [&'static str],
    /// Applied when the request has no usable sort.
    pub default_sort: (&'static str, SortDirection),
    /// Column holding the owning vendor, for vendor scoping.
    pub vendor_column: Option<&'static str>,
    /// Column holding the owning shop, for storefront scoping.
    pub shop_column: Option<&'static str>,
    /// Boolean column restricting storefront lists to live rows.
    pub active_column: Option<&'static str>,
}

/// Who is asking, and how that narrows the rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListContext {
    /// Only rows owned by this vendor.
    pub vendor_id: Option<VendorId>,
    /// Only rows of this shop.
    pub shop_id: Option<ShopId>,
    /// Only rows whose active flag is set.
    pub active_only: bool,
}

impl ListContext {
    /// Platform-wide (admin) scope.
    #[must_use]
    pub const fn platform() -> Self {
        Self {
            vendor_id: None,
            shop_id: None,
            active_only: false,
        }
    }

    /// Rows of one vendor's shops.
    #[must_use]
    pub const fn vendor(vendor_id: VendorId) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            shop_id: None,
            active_only: false,
        }
    }

    /// Admin scope for `None`, vendor scope otherwise.
    #[must_use]
    pub const fn scoped(vendor_id: Option<VendorId>) -> Self {
        match vendor_id {
            Some(vendor_id) => Self::vendor(vendor_id),
            None => Self::platform(),
        }
    }

    /// Live rows of one shop.
    #[must_use]
    pub const fn storefront(shop_id: ShopId) -> Self {
        Self {
            vendor_id: None,
            shop_id: Some(shop_id),
            active_only: true,
        }
    }
}

/// A request resolved against a [`ListSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub order_by: Vec<(&'static str, SortDirection)>,
    pub filters: Vec<(&'static str, FilterValue)>,
    /// Escaped `ILIKE` pattern for the global filter.
    pub search: Option<String>,
    pub window: PageWindow,
}

/// Resolve a request against a spec.
///
/// # Errors
///
/// Returns `RepositoryError::InvalidRequest` for an out-of-range page size.
pub fn plan(spec: &ListSpec, request: &FetchRequest) -> Result<QueryPlan, RepositoryError> {
    let window = request.window()?;

    let mut order_by: Vec<(&'static str, SortDirection)> = Vec::new();
    for sort in &request.sorting {
        let Some(field) = spec.sort_fields.iter().find(|f| f.key == sort.id) else {
            continue;
        };
        if order_by.iter().any(|(column, _)| *column == field.column) {
            continue;
        }
        order_by.push((field.column, sort.direction()));
    }
    if order_by.is_empty() {
        order_by.push(spec.default_sort);
    }
    if !order_by.iter().any(|(column, _)| *column == spec.key_column) {
        order_by.push((spec.key_column, SortDirection::Asc));
    }

    let filters = request
        .column_filters
        .iter()
        .filter_map(|filter| {
            let field = spec.filter_fields.iter().find(|f| f.key == filter.id)?;
            field.kind.coerce(&filter.value).map(|v| (field.column, v))
        })
        .collect();

    let search = if spec.search_columns.is_empty() {
        None
    } else {
        request.search_term().map(like_pattern)
    };

    Ok(QueryPlan {
        order_by,
        filters,
        search,
        window,
    })
}

/// Tracks whether the next condition opens the `WHERE` clause.
#[derive(Default)]
struct WhereClause {
    started: bool,
}

impl WhereClause {
    fn and<'b>(
        &mut self,
        qb: &'b mut QueryBuilder<'static, Postgres>,
    ) -> &'b mut QueryBuilder<'static, Postgres> {
        qb.push(if self.started { " AND " } else { " WHERE " });
        self.started = true;
        qb
    }
}

fn push_scope(
    qb: &mut QueryBuilder<'static, Postgres>,
    clause: &mut WhereClause,
    spec: &ListSpec,
    ctx: &ListContext,
) {
    if let (Some(vendor_id), Some(column)) = (ctx.vendor_id, spec.vendor_column) {
        clause.and(qb).push(column).push(" = ").push_bind(vendor_id);
    }
    if let (Some(shop_id), Some(column)) = (ctx.shop_id, spec.shop_column) {
        clause.and(qb).push(column).push(" = ").push_bind(shop_id);
    }
    if let (true, Some(column)) = (ctx.active_only, spec.active_column) {
        clause.and(qb).push(column).push(" = TRUE");
    }
}

fn push_filters(
    qb: &mut QueryBuilder<'static, Postgres>,
    clause: &mut WhereClause,
    spec: &ListSpec,
    plan: &QueryPlan,
) {
    for (column, value) in &plan.filters {
        let column = *column;
        match value {
            FilterValue::Text(pattern) => {
                clause
                    .and(qb)
                    .push(column)
                    .push(" ILIKE ")
                    .push_bind(pattern.clone());
            }
            FilterValue::Boolean(b) => {
                clause.and(qb).push(column).push(" = ").push_bind(*b);
            }
            FilterValue::Exact(text) => {
                clause
                    .and(qb)
                    .push(column)
                    .push("::text = ")
                    .push_bind(text.clone());
            }
            FilterValue::OneOf(values) => {
                clause
                    .and(qb)
                    .push(column)
                    .push("::text = ANY(")
                    .push_bind(values.clone())
                    .push(")");
            }
            FilterValue::Id(id) => {
                clause.and(qb).push(column).push(" = ").push_bind(*id);
            }
            FilterValue::DateRange { from, until } => {
                if let Some(from) = from {
                    clause.and(qb).push(column).push(" >= ").push_bind(*from);
                }
                if let Some(until) = until {
                    clause.and(qb).push(column).push(" < ").push_bind(*until);
                }
            }
            FilterValue::NumberRange { min, max } => {
                if let Some(min) = min {
                    clause.and(qb).push(column).push(" >= ").push_bind(*min);
                }
                if let Some(max) = max {
                    clause.and(qb).push(column).push(" <= ").push_bind(*max);
                }
            }
        }
    }

    if let Some(pattern) = &plan.search {
        let qb = clause.and(qb);
        qb.push("(");
        for (i, column) in spec.search_columns.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
        }
        qb.push(")");
    }
}

/// The page query: `SELECT ... WHERE ... ORDER BY ... LIMIT ... OFFSET ...`.
#[must_use]
pub fn select_query(
    spec: &ListSpec,
    plan: &QueryPlan,
    ctx: &ListContext,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", spec.select, spec.from));
    let mut clause = WhereClause::default();
    push_scope(&mut qb, &mut clause, spec, ctx);
    push_filters(&mut qb, &mut clause, spec, plan);

    qb.push(" ORDER BY ");
    for (i, (column, direction)) in plan.order_by.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column).push(" ").push(direction.as_sql());
    }

    qb.push(" LIMIT ")
        .push_bind(i64::from(plan.window.limit))
        .push(" OFFSET ")
        .push_bind(i64::try_from(plan.window.offset).unwrap_or(i64::MAX));
    qb
}

/// The count query over the same predicate as [`select_query`].
#[must_use]
pub fn count_query(
    spec: &ListSpec,
    plan: &QueryPlan,
    ctx: &ListContext,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", spec.from));
    let mut clause = WhereClause::default();
    push_scope(&mut qb, &mut clause, spec, ctx);
    push_filters(&mut qb, &mut clause, spec, plan);
    qb
}

/// Fetch one page of rows plus the total matching count.
///
/// The page and the count run concurrently on the pool.
///
/// # Errors
///
/// Returns `RepositoryError::InvalidRequest` for an out-of-range page size
/// and `RepositoryError::Database` if either query fails.
#[instrument(skip(pool, spec, request), fields(entity = spec.entity))]
pub async fn fetch_page<T>(
    pool: &PgPool,
    spec: &ListSpec,
    request: &FetchRequest,
    ctx: &ListContext,
) -> Result<FetchResponse<T>, RepositoryError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let plan = plan(spec, request)?;
    tracing::debug!(
        order_by = ?plan.order_by,
        filters = plan.filters.len(),
        search = plan.search.is_some(),
        limit = plan.window.limit,
        offset = plan.window.offset,
        "fetching page"
    );

    let mut rows_query = select_query(spec, &plan, ctx);
    let mut total_query = count_query(spec, &plan, ctx);
    let (rows, total) = tokio::try_join!(
        rows_query.build_query_as::<T>().fetch_all(pool),
        total_query.build_query_scalar::<i64>().fetch_one(pool),
    )?;

    let total = u64::try_from(total).unwrap_or_default();
    tracing::debug!(total, rows = rows.len(), "fetched page");

    Ok(FetchResponse::new(rows, total, plan.window.limit))
}

/// Fetch a single row by primary key, under the same scope as the list.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn fetch_by_key<T>(
    pool: &PgPool,
    spec: &ListSpec,
    id: i32,
    ctx: &ListContext,
) -> Result<Option<T>, RepositoryError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", spec.select, spec.from));
    let mut clause = WhereClause::default();
    clause.and(&mut qb).push(spec.key_column).push(" = ").push_bind(id);
    push_scope(&mut qb, &mut clause, spec, ctx);

    Ok(qb.build_query_as::<T>().fetch_optional(pool).await?)
}

/// Re-read a row that was just written.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the row has disappeared in between.
pub(crate) async fn reload<T>(pool: &PgPool, spec: &ListSpec, id: i32) -> Result<T, RepositoryError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    fetch_by_key(pool, spec, id, &ListContext::platform())
        .await?
        .ok_or(RepositoryError::NotFound)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::SortSpec;
    use serde_json::json;

    const SPEC: ListSpec = ListSpec {
        entity: "widgets",
        select: "w.id, w.name",
        from: "widgets w JOIN shops s ON s.id = w.shop_id",
        key_column: "w.id",
        sort_fields: &[
            SortField::new("name", "w.name"),
            SortField::new("createdAt", "w.created_at"),
            SortField::new("id", "w.id"),
        ],
        filter_fields: &[
            FilterField::new("name", "w.name", FilterKind::Text),
            FilterField::new("isActive", "w.is_active", FilterKind::Boolean),
            FilterField::new("status", "w.status", FilterKind::OneOf),
            FilterField::new("shopId", "w.shop_id", FilterKind::Id),
            FilterField::new("price", "w.price", FilterKind::NumberRange),
            FilterField::new("createdAt", "w.created_at", FilterKind::DateRange),
        ],
        search_columns: &["w.name", "w.sku"],
        default_sort: ("w.created_at", SortDirection::Desc),
        vendor_column: Some("s.vendor_id"),
        shop_column: Some("w.shop_id"),
        active_column: Some("w.is_active"),
    };

    fn sql(request: &FetchRequest, ctx: &ListContext) -> String {
        let plan = plan(&SPEC, request).unwrap();
        select_query(&SPEC, &plan, ctx).sql().to_string()
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("shoe"), "%shoe%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_boolean_coercion() {
        let kind = FilterKind::Boolean;
        assert_eq!(kind.coerce(&json!(true)), Some(FilterValue::Boolean(true)));
        assert_eq!(kind.coerce(&json!("false")), Some(FilterValue::Boolean(false)));
        assert_eq!(kind.coerce(&json!(" TRUE ")), Some(FilterValue::Boolean(true)));
        assert_eq!(kind.coerce(&json!("yes")), None);
        assert_eq!(kind.coerce(&json!(1)), None);
    }

    #[test]
    fn test_text_coercion_ignores_blank() {
        assert_eq!(FilterKind::Text.coerce(&json!("   ")), None);
        assert_eq!(FilterKind::Text.coerce(&json!(null)), None);
        assert_eq!(
            FilterKind::Text.coerce(&json!(" tee ")),
            Some(FilterValue::Text("%tee%".to_string()))
        );
    }

    #[test]
    fn test_id_coercion() {
        assert_eq!(FilterKind::Id.coerce(&json!(4)), Some(FilterValue::Id(4)));
        assert_eq!(FilterKind::Id.coerce(&json!("12")), Some(FilterValue::Id(12)));
        assert_eq!(FilterKind::Id.coerce(&json!("twelve")), None);
        assert_eq!(FilterKind::Id.coerce(&json!(9_999_999_999_i64)), None);
    }

    #[test]
    fn test_one_of_coercion() {
        assert_eq!(
            FilterKind::OneOf.coerce(&json!(["paid", "", "pending"])),
            Some(FilterValue::OneOf(vec!["paid".to_string(), "pending".to_string()]))
        );
        assert_eq!(
            FilterKind::OneOf.coerce(&json!("shipped")),
            Some(FilterValue::OneOf(vec!["shipped".to_string()]))
        );
        assert_eq!(FilterKind::OneOf.coerce(&json!([])), None);
    }

    #[test]
    fn test_date_range_is_inclusive_by_day() {
        let value = FilterKind::DateRange
            .coerce(&json!({"from": "2026-03-01", "to": "2026-03-31"}))
            .unwrap();
        let FilterValue::DateRange { from, until } = value else {
            panic!("expected a date range");
        };
        assert_eq!(from.unwrap().to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert_eq!(until.unwrap().to_rfc3339(), "2026-04-01T00:00:00+00:00");

        assert!(FilterKind::DateRange.coerce(&json!({"from": "yesterday"})).is_none());
        assert!(FilterKind::DateRange.coerce(&json!(["2026-01-05", null])).is_some());
    }

    #[test]
    fn test_number_range_coercion() {
        assert_eq!(
            FilterKind::NumberRange.coerce(&json!({"min": 10, "max": "99.50"})),
            Some(FilterValue::NumberRange {
                min: Some(Decimal::from(10)),
                max: Some(Decimal::new(9950, 2)),
            })
        );
        assert_eq!(FilterKind::NumberRange.coerce(&json!({"min": "abc"})), None);
    }

    #[test]
    fn test_default_sort_and_tiebreak() {
        let plan = plan(&SPEC, &FetchRequest::default()).unwrap();
        assert_eq!(
            plan.order_by,
            vec![("w.created_at", SortDirection::Desc), ("w.id", SortDirection::Asc)]
        );
    }

    #[test]
    fn test_unknown_and_repeated_sort_fields() {
        let request = FetchRequest::default()
            .sort(SortSpec::desc("bogus"))
            .sort(SortSpec::asc("name"))
            .sort(SortSpec::desc("name"));
        let plan = plan(&SPEC, &request).unwrap();
        assert_eq!(
            plan.order_by,
            vec![("w.name", SortDirection::Asc), ("w.id", SortDirection::Asc)]
        );
    }

    #[test]
    fn test_sorting_by_key_skips_tiebreak() {
        let plan = plan(&SPEC, &FetchRequest::default().sort(SortSpec::desc("id"))).unwrap();
        assert_eq!(plan.order_by, vec![("w.id", SortDirection::Desc)]);
    }

    #[test]
    fn test_unknown_filters_are_ignored() {
        let request = FetchRequest::default()
            .filter("nope", "x")
            .filter("isActive", "maybe")
            .filter("name", "mug");
        let plan = plan(&SPEC, &request).unwrap();
        assert_eq!(plan.filters.len(), 1);
        assert_eq!(plan.filters[0].0, "w.name");
    }

    #[test]
    fn test_page_size_is_checked() {
        let err = plan(&SPEC, &FetchRequest::default().page(0, 0)).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRequest(_)));
    }

    #[test]
    fn test_select_sql_without_conditions() {
        assert_eq!(
            sql(&FetchRequest::default().page(2, 25), &ListContext::platform()),
            "SELECT w.id, w.name FROM widgets w JOIN shops s ON s.id = w.shop_id \
             ORDER BY w.created_at DESC, w.id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_select_sql_with_scope_filters_and_search() {
        let request = FetchRequest::default()
            .filter("name", "mug")
            .filter("status", json!(["paid", "pending"]))
            .filter("price", json!({"min": 5}))
            .search(" blue ")
            .sort(SortSpec::asc("name"));
        assert_eq!(
            sql(&request, &ListContext::vendor(VendorId::new(3))),
            "SELECT w.id, w.name FROM widgets w JOIN shops s ON s.id = w.shop_id \
             WHERE s.vendor_id = $1 AND w.name ILIKE $2 AND w.status::text = ANY($3) \
             AND w.price >= $4 AND (w.name ILIKE $5 OR w.sku ILIKE $6) \
             ORDER BY w.name ASC, w.id ASC LIMIT $7 OFFSET $8"
        );
    }

    #[test]
    fn test_storefront_scope() {
        assert_eq!(
            sql(&FetchRequest::default(), &ListContext::storefront(ShopId::new(9))),
            "SELECT w.id, w.name FROM widgets w JOIN shops s ON s.id = w.shop_id \
             WHERE w.shop_id = $1 AND w.is_active = TRUE \
             ORDER BY w.created_at DESC, w.id ASC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_count_sql_shares_predicate() {
        let request = FetchRequest::default().filter("isActive", true).search("x");
        let plan = plan(&SPEC, &request).unwrap();
        assert_eq!(
            count_query(&SPEC, &plan, &ListContext::platform()).sql(),
            "SELECT COUNT(*) FROM widgets w JOIN shops s ON s.id = w.shop_id \
             WHERE w.is_active = $1 AND (w.name ILIKE $2 OR w.sku ILIKE $3)"
        );
    }

    #[test]
    fn test_filtering_twice_is_idempotent() {
        let request = FetchRequest::default().filter("name", "mug");
        let once = plan(&SPEC, &request).unwrap();
        let twice = plan(&SPEC, &request.clone().filter("name", "mug")).unwrap();
        assert_eq!(once.filters[0], twice.filters[0]);
        assert_eq!(twice.filters[0], twice.filters[1]);
    }
}
