//! Filter, sort and paginate rows the same way in every drill-down frame.

pub mod filter;
pub mod page;
pub mod sort;

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::NaiveDate;

pub use filter::{DateRange, FilterState, NumericRange, StatusFilter, TextSearch};
pub use page::Page;
pub use sort::{SortDirection, SortState};

/// A field value as seen by filters and sorts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }
}

impl From<String> for FieldValue<'_> {
    fn from(value: String) -> Self {
        Self::Text(Cow::Owned(value))
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for FieldValue<'_> {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<'a, T: Into<FieldValue<'a>>> From<Option<T>> for FieldValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// A row type the query engine can filter and sort by named fields.
///
/// Keys outside `fields()` are unknown: filters and sorts on them are no-ops.
pub trait Queryable {
    fn fields() -> &'static [&'static str];

    fn field(&self, key: &str) -> FieldValue<'_>;

    /// Order used while no column sort is chosen.
    fn default_order(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }
}

/// Filter + sort + page state of one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryState {
    pub filters: FilterState,
    pub sort: SortState,
    pub page: Page,
}

/// Rows in the current window plus the counts behind "showing N of M".
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<R> {
    pub items: Vec<R>,
    /// Rows before filtering.
    pub total: usize,
    /// Rows that passed the filters, before paging.
    pub matched: usize,
}

impl<R> QueryResult<R> {
    #[must_use]
    pub fn shown(&self) -> usize {
        self.items.len()
    }

    /// Whether rows past the current window exist.
    #[must_use]
    pub fn has_more(&self, page: &Page) -> bool {
        page.start().saturating_add(self.items.len()) < self.matched
    }

    pub fn map<U>(self, f: impl FnMut(R) -> U) -> QueryResult<U> {
        QueryResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            matched: self.matched,
        }
    }
}

/// Filter, sort, then window `items`.
///
/// An offset window past the last matching row falls back to the last page.
#[must_use]
pub fn apply<'a, T: Queryable>(items: &'a [T], query: &QueryState) -> QueryResult<&'a T> {
    let mut rows: Vec<&T> = items.iter().filter(|item| query.filters.matches(*item)).collect();
    let matched = rows.len();
    query.sort.sort(&mut rows);
    QueryResult {
        items: query.page.clamped_to(matched).window(rows),
        total: items.len(),
        matched,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::time::fixed_today;

    /// Minimal row used by the query tests.
    #[derive(Debug, Clone)]
    pub(crate) struct Row {
        pub id: u64,
        pub name: String,
        pub status: String,
        pub hours: Option<f64>,
        pub date: NaiveDate,
    }

    impl Row {
        pub fn new(id: u64, name: &str, status: &str, hours: f64, day: i64) -> Self {
            Self {
                id,
                name: name.to_owned(),
                status: status.to_owned(),
                hours: Some(hours),
                date: Self::day(day),
            }
        }

        pub fn day(day: i64) -> NaiveDate {
            fixed_today() + chrono::Duration::days(day)
        }

        pub fn without_hours(mut self) -> Self {
            self.hours = None;
            self
        }
    }

    impl Queryable for Row {
        fn fields() -> &'static [&'static str] {
            &["name", "status", "hours", "date"]
        }

        fn field(&self, key: &str) -> FieldValue<'_> {
            match key {
                "name" => self.name.as_str().into(),
                "status" => self.status.as_str().into(),
                "hours" => self.hours.into(),
                "date" => self.date.into(),
                _ => FieldValue::Missing,
            }
        }

        fn default_order(&self, other: &Self) -> Ordering {
            other.date.cmp(&self.date)
        }
    }

    fn paged(page: Page) -> QueryState {
        QueryState {
            page,
            ..QueryState::default()
        }
    }

    fn rows() -> Vec<Row> {
        (1..=25)
            .map(|i| {
                let status = if i % 2 == 0 { "approved" } else { "pending" };
                #[allow(clippy::cast_precision_loss)]
                let hours = i as f64;
                Row::new(i, &format!("row {i}"), status, hours, i64::try_from(i).unwrap_or(0))
            })
            .collect()
    }

    #[test]
    fn apply_reports_total_and_matched() {
        let rows = rows();
        let mut query = paged(Page::prefix(5));
        query.filters.set_statuses("status", ["approved"]);
        let result = apply(&rows, &query);
        assert_eq!(result.total, 25);
        assert_eq!(result.matched, 12);
        assert_eq!(result.shown(), 5);
        assert!(result.has_more(&query.page));
        // Default order is newest first.
        assert_eq!(result.items[0].id, 24);
    }

    #[test]
    fn apply_sorts_before_paging() {
        let rows = rows();
        let mut query = paged(Page::offset(10, 2));
        query.sort.toggle("hours");
        let result = apply(&rows, &query);
        let ids: Vec<u64> = result.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, [21, 22, 23, 24, 25]);
        assert!(!result.has_more(&query.page));
    }

    #[test]
    fn stale_offset_lands_on_last_page() {
        let rows = rows();
        let mut query = paged(Page::offset(5, 4));
        query.filters.set_statuses("status", ["approved"]);
        let result = apply(&rows, &query);
        assert_eq!(result.matched, 12);
        assert_eq!(result.shown(), 2);
        let clamped = query.page.clamped_to(result.matched);
        assert_eq!(clamped.index, 2);
        assert!(!result.has_more(&clamped));
    }

    #[test]
    fn apply_is_idempotent() {
        let rows = rows();
        let mut query = paged(Page::prefix(7));
        query.filters.set_search("1", ["name"]);
        query.sort.toggle("name");
        let first: Vec<u64> = apply(&rows, &query).items.iter().map(|r| r.id).collect();
        let second: Vec<u64> = apply(&rows, &query).items.iter().map(|r| r.id).collect();
        assert_eq!(first, second);
    }
}
