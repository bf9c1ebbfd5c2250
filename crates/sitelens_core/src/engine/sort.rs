//! Comparator/Sorter: stateless, direction-explicit ordering.
//!
//! # Invariants
//! - Keys form a total order: numbers via `f64::total_cmp` after
//!   normalization, text by ordinal (byte) order, instants by millis.
//! - Sorting is stable; equal keys keep input order in both directions.
//! - `Desc` is the exact reverse of `Asc` for distinct keys.

use crate::engine::field::ParseError;
use crate::engine::record::QueryRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction, for callers re-selecting the same column.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(ParseError::Direction(raw.to_string())),
        }
    }
}

/// Column selection held by the calling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + PartialEq> SortState<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Re-selecting the current field flips direction; a new field starts
    /// ascending.
    pub fn select(self, field: F) -> Self {
        if self.field == field {
            Self::new(field, self.direction.toggled())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }
}

/// Comparable projection of one record field.
#[derive(Debug, Clone)]
pub enum SortKey {
    /// Epoch milliseconds; missing dates are `0`.
    Instant(i64),
    /// Finite number; missing values are `0.0`.
    Number(f64),
    /// Missing text is the empty string.
    Text(String),
}

impl SortKey {
    /// Numeric key with non-finite values mapped to zero and `-0.0` folded
    /// into `0.0`.
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value + 0.0)
        } else {
            Self::Number(0.0)
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Instant(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Instant(a), Self::Instant(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Compares two records by `field` in `direction`.
pub fn compare<R: QueryRecord>(
    a: &R,
    b: &R,
    field: R::SortField,
    direction: SortDirection,
) -> Ordering {
    let left = a.sort_key(field, &a.derive_metrics());
    let right = b.sort_key(field, &b.derive_metrics());
    direction.apply(left.cmp(&right))
}

/// Returns the records ordered by `field`; input is never reordered in place.
///
/// Each key is derived once per record.
pub fn sort<'a, R, I>(records: I, field: R::SortField, direction: SortDirection) -> Vec<&'a R>
where
    R: QueryRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut keyed: Vec<(SortKey, &'a R)> = records
        .into_iter()
        .map(|record| (record.sort_key(field, &record.derive_metrics()), record))
        .collect();
    keyed.sort_by(|(left, _), (right, _)| direction.apply(left.cmp(right)));
    keyed.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::{SortDirection, SortKey, SortState};
    use crate::engine::field::ProjectSortField;

    #[test]
    fn negative_zero_equals_zero() {
        assert_eq!(SortKey::number(-0.0).cmp(&SortKey::number(0.0)), std::cmp::Ordering::Equal);
        assert_eq!(SortKey::number(f64::NAN), SortKey::Number(0.0));
    }

    #[test]
    fn text_order_is_ordinal() {
        assert!(SortKey::Text("Zeta".into()) < SortKey::Text("alpha".into()));
    }

    #[test]
    fn direction_parse_and_toggle() {
        assert_eq!("DESC".parse(), Ok(SortDirection::Desc));
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        assert!("sideways".parse::<SortDirection>().is_err());
    }

    #[test]
    fn select_flips_only_for_same_field() {
        let state = SortState::new(ProjectSortField::Budget, SortDirection::Asc);
        let flipped = state.select(ProjectSortField::Budget);
        assert_eq!(flipped.direction, SortDirection::Desc);

        let moved = flipped.select(ProjectSortField::Name);
        assert_eq!(moved, SortState::new(ProjectSortField::Name, SortDirection::Asc));
    }
}
