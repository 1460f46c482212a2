use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::{FieldValue, Queryable};

/// Case-insensitive substring search across a set of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub needle: String,
    pub fields: Vec<String>,
}

/// Keep rows whose status field is one of `allowed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    pub field: String,
    pub allowed: BTreeSet<String>,
}

/// Inclusive numeric bounds on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRange {
    pub field: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Inclusive date bounds on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub field: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Every filter dimension a frame can carry. Dimensions are AND-ed; an unset
/// dimension lets everything through.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    search: Option<TextSearch>,
    statuses: Option<StatusFilter>,
    range: Option<NumericRange>,
    dates: Option<DateRange>,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `fields` for `needle`. A blank needle clears the search.
    pub fn set_search<S: Into<String>>(
        &mut self,
        needle: &str,
        fields: impl IntoIterator<Item = S>,
    ) {
        let needle = needle.trim();
        self.search = (!needle.is_empty()).then(|| TextSearch {
            needle: needle.to_lowercase(),
            fields: fields.into_iter().map(Into::into).collect(),
        });
    }

    /// Restrict `field` to the given values. An empty set clears the filter.
    pub fn set_statuses<S: AsRef<str>>(
        &mut self,
        field: impl Into<String>,
        allowed: impl IntoIterator<Item = S>,
    ) {
        let allowed: BTreeSet<String> = allowed
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self.statuses = (!allowed.is_empty()).then(|| StatusFilter {
            field: field.into(),
            allowed,
        });
    }

    /// Bound `field` to `min..=max`. Two open bounds clear the filter.
    pub fn set_range(&mut self, field: impl Into<String>, min: Option<f64>, max: Option<f64>) {
        self.range = (min.is_some() || max.is_some()).then(|| NumericRange {
            field: field.into(),
            min,
            max,
        });
    }

    /// Bound `field` to `from..=to`. Two open bounds clear the filter.
    pub fn set_dates(
        &mut self,
        field: impl Into<String>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) {
        self.dates = (from.is_some() || to.is_some()).then(|| DateRange {
            field: field.into(),
            from,
            to,
        });
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn search(&self) -> Option<&TextSearch> {
        self.search.as_ref()
    }

    #[must_use]
    pub fn statuses(&self) -> Option<&StatusFilter> {
        self.statuses.as_ref()
    }

    #[must_use]
    pub fn range(&self) -> Option<&NumericRange> {
        self.range.as_ref()
    }

    #[must_use]
    pub fn dates(&self) -> Option<&DateRange> {
        self.dates.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.statuses.is_none()
            && self.range.is_none()
            && self.dates.is_none()
    }

    /// Whether `item` passes every active dimension.
    #[must_use]
    pub fn matches<T: Queryable>(&self, item: &T) -> bool {
        self.search.as_ref().is_none_or(|s| search_matches(s, item))
            && self.statuses.as_ref().is_none_or(|s| status_matches(s, item))
            && self.range.as_ref().is_none_or(|r| range_matches(r, item))
            && self.dates.as_ref().is_none_or(|d| dates_match(d, item))
    }
}

fn knows<T: Queryable>(field: &str) -> bool {
    T::fields().contains(&field)
}

fn search_matches<T: Queryable>(search: &TextSearch, item: &T) -> bool {
    let mut known = search.fields.iter().filter(|f| knows::<T>(f)).peekable();
    if known.peek().is_none() {
        return true;
    }
    known.any(|field| match item.field(field) {
        FieldValue::Text(text) => text.to_lowercase().contains(&search.needle),
        FieldValue::Number(n) => n.to_string().contains(&search.needle),
        FieldValue::Date(d) => d.to_string().contains(&search.needle),
        FieldValue::Missing => false,
    })
}

fn status_matches<T: Queryable>(filter: &StatusFilter, item: &T) -> bool {
    if !knows::<T>(&filter.field) {
        return true;
    }
    match item.field(&filter.field) {
        FieldValue::Text(text) => filter.allowed.contains(&text.to_lowercase()),
        _ => false,
    }
}

fn range_matches<T: Queryable>(range: &NumericRange, item: &T) -> bool {
    if !knows::<T>(&range.field) {
        return true;
    }
    let FieldValue::Number(value) = item.field(&range.field) else {
        return false;
    };
    range.min.is_none_or(|min| value >= min) && range.max.is_none_or(|max| value <= max)
}

fn dates_match<T: Queryable>(range: &DateRange, item: &T) -> bool {
    if !knows::<T>(&range.field) {
        return true;
    }
    let FieldValue::Date(value) = item.field(&range.field) else {
        return false;
    };
    range.from.is_none_or(|from| value >= from) && range.to.is_none_or(|to| value <= to)
}
