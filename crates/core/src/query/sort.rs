use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{FieldValue, Queryable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Column sort for a frame.
///
/// `Unsorted` means the row type's default order (for entries, newest first).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    Unsorted,
    SortedBy {
        key: String,
        direction: SortDirection,
    },
}

impl SortState {
    #[must_use]
    pub fn sorted_by(key: impl Into<String>, direction: SortDirection) -> Self {
        Self::SortedBy {
            key: key.into(),
            direction,
        }
    }

    /// Column-header click: a new key sorts ascending, the same key flips.
    ///
    /// Once a key is chosen the state never returns to `Unsorted`.
    pub fn toggle(&mut self, key: &str) {
        *self = match std::mem::take(self) {
            Self::SortedBy {
                key: current,
                direction,
            } if current == key => Self::SortedBy {
                key: current,
                direction: direction.flipped(),
            },
            _ => Self::sorted_by(key, SortDirection::Asc),
        };
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Unsorted => None,
            Self::SortedBy { key, .. } => Some(key),
        }
    }

    #[must_use]
    pub fn direction(&self) -> Option<SortDirection> {
        match self {
            Self::Unsorted => None,
            Self::SortedBy { direction, .. } => Some(*direction),
        }
    }

    /// Stable sort of `rows`; ties keep their incoming relative order.
    pub fn sort<T: Queryable>(&self, rows: &mut [&T]) {
        match self {
            Self::SortedBy { key, direction } if T::fields().contains(&key.as_str()) => {
                rows.sort_by(|a, b| {
                    let ord = compare_values(&a.field(key), &b.field(key));
                    match direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                });
            }
            _ => rows.sort_by(|a, b| a.default_order(b)),
        }
    }
}

fn rank(value: &FieldValue<'_>) -> u8 {
    match value {
        FieldValue::Number(_) => 0,
        FieldValue::Date(_) => 1,
        FieldValue::Text(_) => 2,
        FieldValue::Missing => 3,
    }
}

/// Ascending comparison; missing values sort after present ones.
fn compare_values(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(y),
        (FieldValue::Date(x), FieldValue::Date(y)) => x.cmp(y),
        (FieldValue::Text(x), FieldValue::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        _ => rank(a).cmp(&rank(b)),
    }
}
