//! Aggregator: summary scalars and chart-ready groupings.
//!
//! # Responsibility
//! - Reduce the filtered set (before sorting and paging) into a [`Summary`]
//!   and [`ChartData`].
//! - Join against the sibling financial dataset on a best-effort basis.
//!
//! # Invariants
//! - Averages over an empty set are `0.0`.
//! - Monthly series are ascending by `(year, month)` and keep only the most
//!   recent `month_window` months present in the data.
//! - Categories are only emitted when present; output is sorted by label.
//! - Cross-reference joins are first-match-wins; unknown keys add nothing.

use crate::engine::criteria::{Criteria, Thresholds};
use crate::engine::record::QueryRecord;
use crate::model::financial::FinancialRecord;
use crate::model::non_blank;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DEFAULT_MONTH_WINDOW: usize = 6;

/// Inputs aggregation needs besides the records themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateContext {
    pub thresholds: Thresholds,
    /// "Now" for age-based completion.
    pub reference_time: DateTime<Utc>,
    pub month_window: usize,
}

impl AggregateContext {
    pub fn at(reference_time: DateTime<Utc>) -> Self {
        Self {
            thresholds: Thresholds::default(),
            reference_time,
            month_window: DEFAULT_MONTH_WINDOW,
        }
    }

    /// Context sharing the thresholds and reference time of `criteria`.
    pub fn from_criteria<C: Copy + Ord>(criteria: &Criteria<C>, month_window: usize) -> Self {
        Self {
            thresholds: criteria.thresholds,
            reference_time: criteria.reference_time,
            month_window,
        }
    }
}

impl Default for AggregateContext {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

/// Scalar statistics over the filtered set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    /// Sum of budget (projects) or total cost (timelines).
    pub total_amount: f64,
    pub average_amount: f64,
    pub status_counts: BTreeMap<String, usize>,
    /// Priority tallies for projects, risk level tallies for timelines.
    pub level_counts: BTreeMap<String, usize>,
    pub high_cost_count: usize,
    pub high_activity_count: usize,
    pub completed_count: usize,
    /// Cross-referenced value summed once per distinct link key.
    pub linked_value: f64,
}

/// Related-record lookup used to enrich summaries.
pub trait LinkLookup {
    fn linked_value(&self, key: &str) -> Option<f64>;
}

/// Financial values indexed by project code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossReference {
    values: HashMap<String, f64>,
}

impl CrossReference {
    /// Indexes `records`; the first record for a code wins.
    pub fn from_records(records: &[FinancialRecord]) -> Self {
        let mut values = HashMap::new();
        for record in records {
            if let Some(code) = non_blank(record.project_code.as_deref()) {
                values
                    .entry(code.to_string())
                    .or_insert_with(|| record.value.non_negative());
            }
        }
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl LinkLookup for CrossReference {
    fn linked_value(&self, key: &str) -> Option<f64> {
        self.values.get(key.trim()).copied()
    }
}

pub fn summarize<R: QueryRecord>(records: &[&R], ctx: &AggregateContext) -> Summary {
    summarize_inner(records, ctx, None)
}

/// Like [`summarize`], also filling `linked_value` through `lookup`.
pub fn summarize_with<R: QueryRecord>(
    records: &[&R],
    ctx: &AggregateContext,
    lookup: &dyn LinkLookup,
) -> Summary {
    summarize_inner(records, ctx, Some(lookup))
}

fn summarize_inner<R: QueryRecord>(
    records: &[&R],
    ctx: &AggregateContext,
    lookup: Option<&dyn LinkLookup>,
) -> Summary {
    let mut summary = Summary {
        count: records.len(),
        ..Summary::default()
    };
    let mut link_keys = BTreeSet::new();

    for &record in records {
        let metrics = record.derive_metrics();
        let amount = R::amount(&metrics);
        summary.total_amount += amount;

        *summary
            .status_counts
            .entry(record.status_label().to_string())
            .or_insert(0) += 1;
        if let Some(level) = record.level_label(&metrics) {
            *summary.level_counts.entry(level.to_string()).or_insert(0) += 1;
        }

        if amount > ctx.thresholds.high_cost {
            summary.high_cost_count += 1;
        }
        if R::activity(&metrics) > ctx.thresholds.high_activity {
            summary.high_activity_count += 1;
        }
        if record.is_completed(ctx.reference_time) {
            summary.completed_count += 1;
        }
        if let Some(key) = record.link_key() {
            link_keys.insert(key);
        }
    }

    summary.average_amount = if summary.count == 0 {
        0.0
    } else {
        summary.total_amount / summary.count as f64
    };

    if let Some(lookup) = lookup {
        summary.linked_value = link_keys
            .into_iter()
            .filter_map(|key| lookup.linked_value(key))
            .sum();
    }

    summary
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM`.
    pub label: String,
    pub count: usize,
    /// Hours (timelines) or budget (projects) summed over the month.
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RadarAxis {
    Workers,
    Engineers,
    Architects,
    Hours,
    Cost,
    Notes,
}

impl RadarAxis {
    pub const ALL: [RadarAxis; 6] = [
        Self::Workers,
        Self::Engineers,
        Self::Architects,
        Self::Hours,
        Self::Cost,
        Self::Notes,
    ];
}

/// Per-record values for every radar axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RadarSample {
    pub workers: f64,
    pub engineers: f64,
    pub architects: f64,
    pub hours: f64,
    pub cost: f64,
    /// `1.0` when the record carries notes.
    pub notes: f64,
}

impl RadarSample {
    pub fn value(&self, axis: RadarAxis) -> f64 {
        match axis {
            RadarAxis::Workers => self.workers,
            RadarAxis::Engineers => self.engineers,
            RadarAxis::Architects => self.architects,
            RadarAxis::Hours => self.hours,
            RadarAxis::Cost => self.cost,
            RadarAxis::Notes => self.notes,
        }
    }
}

/// Raw per-axis average; display scaling belongs to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub axis: RadarAxis,
    pub average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub categories: Vec<CategoryCount>,
    pub monthly: Vec<MonthlyPoint>,
    /// Empty for record kinds without a radar chart.
    pub radar: Vec<RadarPoint>,
}

pub fn build_chart_series<R: QueryRecord>(records: &[&R], ctx: &AggregateContext) -> ChartData {
    ChartData {
        categories: category_breakdown(records),
        monthly: monthly_series(records, ctx.month_window),
        radar: radar_series(records),
    }
}

pub fn category_breakdown<R: QueryRecord>(records: &[&R]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        for category in record.chart_categories() {
            *counts.entry(category.into_owned()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect()
}

/// Groups by `(year, month)` of the primary date; undated records are skipped.
pub fn monthly_series<R: QueryRecord>(records: &[&R], month_window: usize) -> Vec<MonthlyPoint> {
    let mut buckets: BTreeMap<(i32, u32), (usize, f64)> = BTreeMap::new();
    for record in records {
        let Some(instant) = record.primary_date() else {
            continue;
        };
        let bucket = buckets.entry((instant.year(), instant.month())).or_insert((0, 0.0));
        bucket.0 += 1;
        bucket.1 += R::trend_amount(&record.derive_metrics());
    }

    let skip = buckets.len().saturating_sub(month_window);
    buckets
        .into_iter()
        .skip(skip)
        .map(|((year, month), (count, amount))| MonthlyPoint {
            year,
            month,
            label: format!("{year:04}-{month:02}"),
            count,
            amount,
        })
        .collect()
}

/// Average of every radar axis over the whole filtered set.
pub fn radar_series<R: QueryRecord>(records: &[&R]) -> Vec<RadarPoint> {
    let axes = R::radar_axes();
    if axes.is_empty() {
        return Vec::new();
    }

    let mut totals = RadarSample::default();
    for record in records {
        if let Some(sample) = record.radar_sample(&record.derive_metrics()) {
            totals.workers += sample.workers;
            totals.engineers += sample.engineers;
            totals.architects += sample.architects;
            totals.hours += sample.hours;
            totals.cost += sample.cost;
            totals.notes += sample.notes;
        }
    }

    let count = records.len();
    axes.iter()
        .map(|axis| RadarPoint {
            axis: *axis,
            average: if count == 0 {
                0.0
            } else {
                totals.value(*axis) / count as f64
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{monthly_series, CrossReference, LinkLookup};
    use crate::model::financial::FinancialRecord;
    use crate::model::timeline::TimelineRecord;

    #[test]
    fn cross_reference_first_match_wins() {
        let lookup = CrossReference::from_records(&[
            FinancialRecord::new("PRJ-1", 500.0),
            FinancialRecord::new("PRJ-1", 900.0),
            FinancialRecord::new("PRJ-2", "$1,000"),
        ]);
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.linked_value("PRJ-1"), Some(500.0));
        assert_eq!(lookup.linked_value("PRJ-2"), Some(1_000.0));
        assert_eq!(lookup.linked_value("PRJ-404"), None);
    }

    #[test]
    fn monthly_series_skips_undated_records() {
        let dated = TimelineRecord::new("a", "2024-02-10");
        let undated = TimelineRecord::new("b", "not a date");
        let points = monthly_series(&[&dated, &undated], 6);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "2024-02");
        assert_eq!(points[0].count, 1);
    }
}
