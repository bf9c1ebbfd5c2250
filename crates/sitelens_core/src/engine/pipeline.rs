//! One-call composition of the five engine stages.
//!
//! raw records -> filter -> { summarize + charts, sort -> paginate }
//!
//! # Invariants
//! - Summary and charts are computed over the full filtered set, never the
//!   page.
//! - Without a sort selection the filtered set keeps input order.

use crate::config::EngineConfig;
use crate::engine::aggregate::{
    build_chart_series, summarize, summarize_with, AggregateContext, ChartData, LinkLookup,
    Summary, DEFAULT_MONTH_WINDOW,
};
use crate::engine::criteria::{filter, Criteria};
use crate::engine::field::{ProjectCategory, ProjectSortField, TimelineCategory, TimelineSortField};
use crate::engine::paginate::{paginate, Page, DEFAULT_PAGE_SIZE};
use crate::engine::record::QueryRecord;
use crate::engine::sort::{sort, SortDirection, SortState};
use serde::Serialize;

/// Filter, sort and page selection held by the calling layer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams<C, F> {
    pub criteria: Criteria<C>,
    pub sort: Option<SortState<F>>,
    pub page_size: usize,
    /// 1-indexed.
    pub page_number: usize,
    pub month_window: usize,
}

pub type ProjectQuery = QueryParams<ProjectCategory, ProjectSortField>;
pub type TimelineQuery = QueryParams<TimelineCategory, TimelineSortField>;

impl<C: Copy + Ord, F: Copy + PartialEq> QueryParams<C, F> {
    /// First page, default size, no sort.
    pub fn new(criteria: Criteria<C>) -> Self {
        Self {
            criteria,
            sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            page_number: 1,
            month_window: DEFAULT_MONTH_WINDOW,
        }
    }

    /// Like [`QueryParams::new`], with paging, window and thresholds from
    /// `config`.
    pub fn from_config(criteria: Criteria<C>, config: &EngineConfig) -> Self {
        Self {
            criteria: criteria.with_thresholds(config.thresholds()),
            sort: None,
            page_size: config.default_page_size,
            page_number: 1,
            month_window: config.month_window,
        }
    }

    pub fn with_sort(mut self, field: F, direction: SortDirection) -> Self {
        self.sort = Some(SortState::new(field, direction));
        self
    }

    pub fn with_page(mut self, page_number: usize) -> Self {
        self.page_number = page_number;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn aggregate_context(&self) -> AggregateContext {
        AggregateContext::from_criteria(&self.criteria, self.month_window)
    }
}

/// Everything a dashboard renders for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome<T> {
    pub summary: Summary,
    pub charts: ChartData,
    pub page: Page<T>,
}

impl<R: Clone> QueryOutcome<&R> {
    /// Clones the page items so the outcome outlives the snapshot.
    pub fn into_owned(self) -> QueryOutcome<R> {
        QueryOutcome {
            summary: self.summary,
            charts: self.charts,
            page: self.page.map(R::clone),
        }
    }
}

pub fn run_query<'a, R: QueryRecord>(
    records: &'a [R],
    params: &QueryParams<R::Category, R::SortField>,
) -> QueryOutcome<&'a R> {
    run(records, params, None)
}

/// Like [`run_query`], enriching the summary through `lookup`.
pub fn run_query_with<'a, R: QueryRecord>(
    records: &'a [R],
    params: &QueryParams<R::Category, R::SortField>,
    lookup: &dyn LinkLookup,
) -> QueryOutcome<&'a R> {
    run(records, params, Some(lookup))
}

fn run<'a, R: QueryRecord>(
    records: &'a [R],
    params: &QueryParams<R::Category, R::SortField>,
    lookup: Option<&dyn LinkLookup>,
) -> QueryOutcome<&'a R> {
    let filtered = filter(records, &params.criteria);
    let ctx = params.aggregate_context();

    let summary = match lookup {
        Some(lookup) => summarize_with(&filtered, &ctx, lookup),
        None => summarize(&filtered, &ctx),
    };
    let charts = build_chart_series(&filtered, &ctx);

    let ordered = match params.sort {
        Some(state) => sort(filtered.iter().copied(), state.field, state.direction),
        None => filtered,
    };
    let page = paginate(&ordered, params.page_size, params.page_number);

    QueryOutcome {
        summary,
        charts,
        page,
    }
}
