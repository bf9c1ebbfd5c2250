//! Core query engine for the SiteLens project dashboards.
//! This crate is the single source of truth for filtering, sorting,
//! aggregation and paging rules shared by every dashboard view.

pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use engine::aggregate::{
    build_chart_series, summarize, summarize_with, AggregateContext, CategoryCount, ChartData,
    CrossReference, LinkLookup, MonthlyPoint, RadarAxis, RadarPoint, Summary,
};
pub use engine::criteria::{filter, matches, Criteria, Predicate, QuickFilter, Thresholds};
pub use engine::field::{
    ParseError, ProjectCategory, ProjectSortField, TimelineCategory, TimelineSortField,
};
pub use engine::metrics::{ProjectMetrics, TimelineMetrics};
pub use engine::paginate::{paginate, Page};
pub use engine::pipeline::{
    run_query, run_query_with, ProjectQuery, QueryOutcome, QueryParams, TimelineQuery,
};
pub use engine::record::{derive_metrics, QueryRecord};
pub use engine::sort::{compare, sort, SortDirection, SortKey, SortState};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::financial::FinancialRecord;
pub use model::level::Level;
pub use model::numeric::Amount;
pub use model::project::{Issue, ProjectRecord, ProjectStatus};
pub use model::timeline::{
    Expense, Material, ProjectSummary, StaffMember, TimelineRecord, Tool,
};
pub use model::RecordId;
pub use service::dashboard_service::DashboardService;
pub use service::source::{FnSource, JsonSnapshotSource, RecordSource, SourceError};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
