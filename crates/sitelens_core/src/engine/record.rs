//! Per-kind adapters that let one pipeline serve projects and timelines.
//!
//! # Responsibility
//! - Map each record kind onto the generic reads the engine needs: search
//!   text, categorical values, the relevant date and amount, sort keys.
//! - Route every derived read through [`QueryRecord::derive_metrics`] so
//!   filtering, sorting and aggregation cannot drift apart.

use crate::engine::aggregate::{RadarAxis, RadarSample};
use crate::engine::field::{ProjectCategory, ProjectSortField, TimelineCategory, TimelineSortField};
use crate::engine::metrics::{
    derive_project_metrics, derive_timeline_metrics, ProjectMetrics, TimelineMetrics,
};
use crate::engine::sort::SortKey;
use crate::model::date::{self, SEARCH_DATE_FORMAT};
use crate::model::level::Level;
use crate::model::non_blank;
use crate::model::project::{ProjectRecord, ProjectStatus};
use crate::model::timeline::TimelineRecord;
use chrono::{DateTime, Duration, Utc};
use std::borrow::Cow;
use std::fmt::Debug;

/// Age after which a timeline entry counts as completed.
pub const TIMELINE_COMPLETED_AFTER_DAYS: i64 = 7;

/// A record kind the query engine can filter, sort and aggregate.
pub trait QueryRecord {
    type Metrics: Clone + Debug;
    type SortField: Copy + PartialEq + Debug;
    type Category: Copy + Ord + Debug;

    fn derive_metrics(&self) -> Self::Metrics;

    /// Text fields matched by free-text search.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Value of a categorical field, `None` when absent.
    ///
    /// Enumerated fields (status, levels) yield their canonical label.
    fn category_value(
        &self,
        field: Self::Category,
        metrics: &Self::Metrics,
    ) -> Option<Cow<'_, str>>;

    /// Maps a selected value onto the form [`QueryRecord::category_value`]
    /// yields, so any spelling a record can arrive with selects it.
    fn normalize_selection(_field: Self::Category, selected: &str) -> Cow<'_, str> {
        Cow::Borrowed(selected)
    }

    /// Date used by range filters, quick filters and monthly series.
    fn primary_date(&self) -> Option<DateTime<Utc>>;

    /// Amount used by range filters, `highCost` and summary totals.
    fn amount(metrics: &Self::Metrics) -> f64;

    /// Activity measure compared against the `highActivity` threshold.
    fn activity(metrics: &Self::Metrics) -> f64;

    /// Secondary metric summed per month in trend series.
    fn trend_amount(metrics: &Self::Metrics) -> f64;

    fn sort_key(&self, field: Self::SortField, metrics: &Self::Metrics) -> SortKey;

    fn status_label(&self) -> &'static str;

    /// Label tallied in `Summary::level_counts`.
    fn level_label(&self, metrics: &Self::Metrics) -> Option<&'static str>;

    fn is_completed(&self, reference: DateTime<Utc>) -> bool;

    /// Category contributions for the breakdown chart.
    fn chart_categories(&self) -> Vec<Cow<'_, str>>;

    /// Key used to join against the sibling financial dataset.
    fn link_key(&self) -> Option<&str>;

    /// Axes of the radar chart; empty when the kind has none.
    fn radar_axes() -> &'static [RadarAxis] {
        &[]
    }

    fn radar_sample(&self, _metrics: &Self::Metrics) -> Option<RadarSample> {
        None
    }
}

/// Derives the metric bag for any supported record.
pub fn derive_metrics<R: QueryRecord>(record: &R) -> R::Metrics {
    record.derive_metrics()
}

fn text_key(value: Option<&str>) -> SortKey {
    SortKey::Text(value.unwrap_or_default().to_string())
}

/// Canonical status label for a selected value; unknown spellings stay as
/// typed so they only match themselves.
fn status_selection(selected: &str) -> Cow<'_, str> {
    match ProjectStatus::parse(selected) {
        ProjectStatus::Unknown => Cow::Borrowed(selected),
        known => Cow::Borrowed(known.as_str()),
    }
}

fn level_selection(selected: &str) -> Cow<'_, str> {
    match Level::parse(selected) {
        Some(level) => Cow::Borrowed(level.as_str()),
        None => Cow::Borrowed(selected),
    }
}

fn status_key(status: ProjectStatus) -> SortKey {
    match status {
        ProjectStatus::Unknown => SortKey::Text(String::new()),
        known => SortKey::Text(known.as_str().to_string()),
    }
}

impl QueryRecord for ProjectRecord {
    type Metrics = ProjectMetrics;
    type SortField = ProjectSortField;
    type Category = ProjectCategory;

    fn derive_metrics(&self) -> ProjectMetrics {
        derive_project_metrics(self)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        [&self.name, &self.location, &self.description, &self.observations]
            .into_iter()
            .filter_map(|field| field.as_deref().map(Cow::Borrowed))
            .collect()
    }

    fn category_value(
        &self,
        field: ProjectCategory,
        _metrics: &ProjectMetrics,
    ) -> Option<Cow<'_, str>> {
        match field {
            ProjectCategory::Status => Some(Cow::Borrowed(self.status.as_str())),
            ProjectCategory::Type => self.kind.as_deref().map(Cow::Borrowed),
            ProjectCategory::Priority => self.priority.map(|p| Cow::Borrowed(p.as_str())),
            ProjectCategory::Location => self.location.as_deref().map(Cow::Borrowed),
        }
    }

    fn normalize_selection(field: ProjectCategory, selected: &str) -> Cow<'_, str> {
        match field {
            ProjectCategory::Status => status_selection(selected),
            ProjectCategory::Priority => level_selection(selected),
            ProjectCategory::Type | ProjectCategory::Location => Cow::Borrowed(selected),
        }
    }

    fn primary_date(&self) -> Option<DateTime<Utc>> {
        date::parse_field(self.created_at.as_deref())
    }

    fn amount(metrics: &ProjectMetrics) -> f64 {
        metrics.budget
    }

    fn activity(metrics: &ProjectMetrics) -> f64 {
        metrics.issue_count as f64
    }

    fn trend_amount(metrics: &ProjectMetrics) -> f64 {
        metrics.budget
    }

    fn sort_key(&self, field: ProjectSortField, metrics: &ProjectMetrics) -> SortKey {
        match field {
            ProjectSortField::Name => text_key(self.name.as_deref()),
            ProjectSortField::Status => status_key(self.status),
            ProjectSortField::Priority => text_key(self.priority.map(|p| p.as_str())),
            ProjectSortField::CreatedAt => SortKey::Instant(date::sort_millis(self.primary_date())),
            ProjectSortField::EndDate => SortKey::Instant(date::sort_millis(date::parse_field(
                self.end_date.as_deref(),
            ))),
            ProjectSortField::Budget => SortKey::number(metrics.budget),
            ProjectSortField::IssueCount => SortKey::number(metrics.issue_count as f64),
        }
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn level_label(&self, _metrics: &ProjectMetrics) -> Option<&'static str> {
        self.priority.map(|p| p.as_str())
    }

    fn is_completed(&self, _reference: DateTime<Utc>) -> bool {
        self.status == ProjectStatus::Completed
    }

    fn chart_categories(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.status.as_str())]
    }

    fn link_key(&self) -> Option<&str> {
        non_blank(self.code.as_deref())
    }
}

impl QueryRecord for TimelineRecord {
    type Metrics = TimelineMetrics;
    type SortField = TimelineSortField;
    type Category = TimelineCategory;

    fn derive_metrics(&self) -> TimelineMetrics {
        derive_timeline_metrics(self)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = Vec::with_capacity(5);
        if let Some(raw) = self.date.as_deref() {
            fields.push(Cow::Borrowed(raw));
        }
        if let Some(parsed) = self.primary_date() {
            fields.push(Cow::Owned(parsed.format(SEARCH_DATE_FORMAT).to_string()));
        }
        fields.extend(self.notes.as_deref().map(Cow::Borrowed));
        fields.extend(self.project_name().map(Cow::Borrowed));
        fields.extend(self.project_code().map(Cow::Borrowed));
        fields
    }

    fn category_value(
        &self,
        field: TimelineCategory,
        metrics: &TimelineMetrics,
    ) -> Option<Cow<'_, str>> {
        match field {
            TimelineCategory::ProjectCode => self.project_code().map(Cow::Borrowed),
            TimelineCategory::Status => Some(Cow::Borrowed(self.project_status().as_str())),
            TimelineCategory::Location => self.project_location().map(Cow::Borrowed),
            TimelineCategory::RiskLevel => Some(Cow::Borrowed(metrics.risk_level.as_str())),
            TimelineCategory::ActivityLevel => {
                Some(Cow::Borrowed(metrics.activity_level.as_str()))
            }
        }
    }

    fn normalize_selection(field: TimelineCategory, selected: &str) -> Cow<'_, str> {
        match field {
            TimelineCategory::Status => status_selection(selected),
            TimelineCategory::RiskLevel | TimelineCategory::ActivityLevel => {
                level_selection(selected)
            }
            TimelineCategory::ProjectCode | TimelineCategory::Location => {
                Cow::Borrowed(selected)
            }
        }
    }

    fn primary_date(&self) -> Option<DateTime<Utc>> {
        date::parse_field(self.date.as_deref())
    }

    fn amount(metrics: &TimelineMetrics) -> f64 {
        metrics.total_cost
    }

    fn activity(metrics: &TimelineMetrics) -> f64 {
        metrics.total_staff
    }

    fn trend_amount(metrics: &TimelineMetrics) -> f64 {
        metrics.total_hours
    }

    fn sort_key(&self, field: TimelineSortField, metrics: &TimelineMetrics) -> SortKey {
        match field {
            TimelineSortField::Date => SortKey::Instant(date::sort_millis(self.primary_date())),
            TimelineSortField::ProjectName => text_key(self.project_name()),
            TimelineSortField::ProjectCode => text_key(self.project_code()),
            TimelineSortField::Status => status_key(self.project_status()),
            TimelineSortField::TotalCost => SortKey::number(metrics.total_cost),
            TimelineSortField::TotalHours => SortKey::number(metrics.total_hours),
            TimelineSortField::TotalStaff => SortKey::number(metrics.total_staff),
            TimelineSortField::Efficiency => SortKey::number(metrics.efficiency),
            TimelineSortField::WorkerCount => SortKey::number(metrics.worker_count),
        }
    }

    fn status_label(&self) -> &'static str {
        self.project_status().as_str()
    }

    fn level_label(&self, metrics: &TimelineMetrics) -> Option<&'static str> {
        Some(metrics.risk_level.as_str())
    }

    // Placeholder business rule kept as the dashboards ship it: any entry with
    // notes, or older than a week, is reported as completed.
    fn is_completed(&self, reference: DateTime<Utc>) -> bool {
        if self.has_notes() {
            return true;
        }
        self.primary_date()
            .map(|day| reference - day > Duration::days(TIMELINE_COMPLETED_AFTER_DAYS))
            .unwrap_or(false)
    }

    fn chart_categories(&self) -> Vec<Cow<'_, str>> {
        self.staff()
            .map(|(group, member)| {
                non_blank(member.specialty_or_role.as_deref())
                    .map(Cow::Borrowed)
                    .unwrap_or(Cow::Borrowed(group.as_str()))
            })
            .collect()
    }

    fn link_key(&self) -> Option<&str> {
        self.project_code()
    }

    fn radar_axes() -> &'static [RadarAxis] {
        &RadarAxis::ALL
    }

    fn radar_sample(&self, metrics: &TimelineMetrics) -> Option<RadarSample> {
        Some(RadarSample {
            workers: metrics.worker_count,
            engineers: metrics.engineer_count,
            architects: metrics.architect_count,
            hours: metrics.total_hours,
            cost: metrics.total_cost,
            notes: if self.has_notes() { 1.0 } else { 0.0 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::QueryRecord;
    use crate::engine::field::TimelineCategory;
    use crate::model::timeline::{ProjectSummary, TimelineRecord};
    use chrono::{TimeZone, Utc};

    #[test]
    fn timeline_search_fields_include_formatted_date() {
        let mut record = TimelineRecord::new("t", "2024-03-05");
        record.project_summary = Some(ProjectSummary {
            name: Some("Harbor".to_string()),
            ..ProjectSummary::default()
        });

        let fields: Vec<String> = record
            .search_fields()
            .into_iter()
            .map(|f| f.into_owned())
            .collect();
        assert!(fields.contains(&"05/03/2024".to_string()));
        assert!(fields.contains(&"Harbor".to_string()));
    }

    #[test]
    fn missing_summary_degrades_to_unknown_status() {
        let record = TimelineRecord::new("t", "2024-03-05");
        let metrics = record.derive_metrics();
        let status = record.category_value(TimelineCategory::Status, &metrics);
        assert_eq!(status.as_deref(), Some("unknown"));
        assert!(record.category_value(TimelineCategory::Location, &metrics).is_none());
    }

    #[test]
    fn completed_heuristic_uses_notes_or_age() {
        let reference = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();

        let recent = TimelineRecord::new("a", "2024-03-18");
        assert!(!recent.is_completed(reference));

        let old = TimelineRecord::new("b", "2024-03-01");
        assert!(old.is_completed(reference));

        let mut noted = TimelineRecord::new("c", "2024-03-19");
        noted.notes = Some("poured slab".to_string());
        assert!(noted.is_completed(reference));

        let undated = TimelineRecord::default();
        assert!(!undated.is_completed(reference));
    }
}
