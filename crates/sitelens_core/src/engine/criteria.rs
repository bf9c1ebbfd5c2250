//! Predicate Filter: declarative criteria compiled into one AND of predicates.
//!
//! # Responsibility
//! - Hold every filter option a dashboard offers in one [`Criteria`] value.
//! - Compile active options into [`Predicate`]s that can be tested alone.
//!
//! # Invariants
//! - Inactive options (blank text, empty selection, open range, `None`
//!   quick filter) compile to nothing and match everything.
//! - A record without a parseable date fails every date-based predicate.
//! - Quick filters use the criteria's reference time, never the wall clock
//!   at evaluation time. Calendar days are UTC days.

use crate::engine::field::ParseError;
use crate::engine::record::QueryRecord;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const HIGH_COST_THRESHOLD: f64 = 10_000.0;
pub const HIGH_ACTIVITY_THRESHOLD: f64 = 10.0;
const WEEK_DAYS: i64 = 7;

/// One-click named filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuickFilter {
    #[default]
    None,
    Today,
    Week,
    Month,
    HighCost,
    HighActivity,
}

impl FromStr for QuickFilter {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "" | "none" | "all" => Ok(Self::None),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "highcost" => Ok(Self::HighCost),
            "highactivity" => Ok(Self::HighActivity),
            _ => Err(ParseError::QuickFilter(raw.to_string())),
        }
    }
}

/// Cut-offs for the `highCost` and `highActivity` quick filters and tallies.
///
/// Both are exclusive: a value must exceed the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub high_cost: f64,
    pub high_activity: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_cost: HIGH_COST_THRESHOLD,
            high_activity: HIGH_ACTIVITY_THRESHOLD,
        }
    }
}

/// Inclusive instant range; open on a side when that bound is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| instant >= start)
            && self.end.map_or(true, |end| instant <= end)
    }
}

/// Inclusive numeric range over the record's amount.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AmountRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AmountRange {
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// One compiled filter test.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<C> {
    /// Lowercased needle matched as a substring of any search field.
    Search(String),
    Category { field: C, value: String },
    Date(DateRange),
    Amount(AmountRange),
    Quick {
        filter: QuickFilter,
        thresholds: Thresholds,
        reference: DateTime<Utc>,
    },
}

impl<C: Copy> Predicate<C> {
    /// Evaluates this predicate alone against `record`.
    pub fn test<R: QueryRecord<Category = C>>(&self, record: &R) -> bool {
        self.test_evaluated(&Evaluated::new(record))
    }

    fn test_evaluated<R: QueryRecord<Category = C>>(&self, eval: &Evaluated<'_, R>) -> bool {
        let record = eval.record;
        match self {
            Self::Search(needle) => record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
            Self::Category { field, value } => {
                let wanted = R::normalize_selection(*field, value);
                record
                    .category_value(*field, eval.metrics())
                    .is_some_and(|actual| actual == wanted)
            }
            Self::Date(range) => record
                .primary_date()
                .is_some_and(|instant| range.contains(instant)),
            Self::Amount(range) => range.contains(R::amount(eval.metrics())),
            Self::Quick {
                filter,
                thresholds,
                reference,
            } => match filter {
                QuickFilter::None => true,
                QuickFilter::Today => {
                    within_days(record, reference.date_naive(), reference.date_naive())
                }
                QuickFilter::Week => {
                    let today = reference.date_naive();
                    within_days(record, today - Duration::days(WEEK_DAYS), today)
                }
                QuickFilter::Month => {
                    let today = reference.date_naive();
                    today
                        .checked_sub_months(Months::new(1))
                        .is_some_and(|start| within_days(record, start, today))
                }
                QuickFilter::HighCost => R::amount(eval.metrics()) > thresholds.high_cost,
                QuickFilter::HighActivity => R::activity(eval.metrics()) > thresholds.high_activity,
            },
        }
    }
}

fn within_days<R: QueryRecord>(record: &R, first: NaiveDate, last: NaiveDate) -> bool {
    record
        .primary_date()
        .map(|instant| instant.date_naive())
        .is_some_and(|day| day >= first && day <= last)
}

/// Record paired with lazily derived metrics, shared by all predicates of
/// one evaluation.
struct Evaluated<'a, R: QueryRecord> {
    record: &'a R,
    metrics: OnceCell<R::Metrics>,
}

impl<'a, R: QueryRecord> Evaluated<'a, R> {
    fn new(record: &'a R) -> Self {
        Self {
            record,
            metrics: OnceCell::new(),
        }
    }

    fn metrics(&self) -> &R::Metrics {
        self.metrics.get_or_init(|| self.record.derive_metrics())
    }
}

/// Full set of active filter options for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria<C> {
    /// Case-insensitive substring; blank matches everything.
    pub search_text: String,
    /// Field to selected value; blank selections are ignored.
    pub categories: BTreeMap<C, String>,
    pub date_range: DateRange,
    pub amount_range: AmountRange,
    pub quick_filter: QuickFilter,
    pub thresholds: Thresholds,
    /// "Now" for quick filters.
    pub reference_time: DateTime<Utc>,
    conjuncts: Vec<Predicate<C>>,
}

impl<C: Copy + Ord> Default for Criteria<C> {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

impl<C: Copy + Ord> Criteria<C> {
    /// Empty criteria anchored at the current time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty criteria anchored at `reference_time`.
    pub fn at(reference_time: DateTime<Utc>) -> Self {
        Self {
            search_text: String::new(),
            categories: BTreeMap::new(),
            date_range: DateRange::default(),
            amount_range: AmountRange::default(),
            quick_filter: QuickFilter::None,
            thresholds: Thresholds::default(),
            reference_time,
            conjuncts: Vec::new(),
        }
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_category(mut self, field: C, value: impl Into<String>) -> Self {
        self.categories.insert(field, value.into());
        self
    }

    pub fn with_date_range(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.date_range = DateRange { start, end };
        self
    }

    pub fn with_amount_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.amount_range = AmountRange { min, max };
        self
    }

    pub fn with_quick_filter(mut self, filter: QuickFilter) -> Self {
        self.quick_filter = filter;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Conjunction: a record must satisfy both `self` and `other`.
    ///
    /// `other` keeps its own reference time and thresholds.
    pub fn and(mut self, other: Criteria<C>) -> Self {
        self.conjuncts.extend(other.predicates());
        self
    }

    /// Compiles the active options into predicates.
    pub fn predicates(&self) -> Vec<Predicate<C>> {
        let mut predicates = Vec::new();

        let needle = self.search_text.trim().to_lowercase();
        if !needle.is_empty() {
            predicates.push(Predicate::Search(needle));
        }

        for (field, value) in &self.categories {
            if !value.trim().is_empty() {
                predicates.push(Predicate::Category {
                    field: *field,
                    value: value.clone(),
                });
            }
        }

        if !self.date_range.is_open() {
            predicates.push(Predicate::Date(self.date_range));
        }
        if !self.amount_range.is_open() {
            predicates.push(Predicate::Amount(self.amount_range));
        }
        if self.quick_filter != QuickFilter::None {
            predicates.push(Predicate::Quick {
                filter: self.quick_filter,
                thresholds: self.thresholds,
                reference: self.reference_time,
            });
        }

        predicates.extend(self.conjuncts.iter().cloned());
        predicates
    }

    /// Whether every record would match.
    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }
}

/// Tests one record against every active criterion.
pub fn matches<R: QueryRecord>(record: &R, criteria: &Criteria<R::Category>) -> bool {
    let predicates = criteria.predicates();
    matches_all(record, &predicates)
}

/// Returns the records passing `criteria`, in input order.
pub fn filter<'a, R, I>(records: I, criteria: &Criteria<R::Category>) -> Vec<&'a R>
where
    R: QueryRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let predicates = criteria.predicates();
    records
        .into_iter()
        .filter(|record| matches_all(*record, &predicates))
        .collect()
}

fn matches_all<R: QueryRecord>(record: &R, predicates: &[Predicate<R::Category>]) -> bool {
    let eval = Evaluated::new(record);
    predicates
        .iter()
        .all(|predicate| predicate.test_evaluated(&eval))
}
