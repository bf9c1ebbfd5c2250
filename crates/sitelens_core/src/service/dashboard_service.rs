//! Dashboard use-case service.
//!
//! # Responsibility
//! - Pull one snapshot from a [`RecordSource`] per call.
//! - Turn fetch failures into an empty snapshot so views still render.
//! - Run the query pipeline with configured defaults.
//!
//! # Invariants
//! - The service never retries a failed fetch.
//! - Log events carry metadata only (counts, error kinds), never record
//!   content.

use crate::config::EngineConfig;
use crate::engine::aggregate::LinkLookup;
use crate::engine::criteria::Criteria;
use crate::engine::pipeline::{run_query, run_query_with, QueryOutcome, QueryParams};
use crate::engine::record::QueryRecord;
use crate::service::source::RecordSource;
use log::{debug, warn};
use std::marker::PhantomData;

/// Use-case service over one record kind and its source.
pub struct DashboardService<R, S: RecordSource<R>> {
    source: S,
    config: EngineConfig,
    _record: PhantomData<fn() -> R>,
}

impl<R, S> DashboardService<R, S>
where
    R: QueryRecord + Clone,
    S: RecordSource<R>,
{
    pub fn new(source: S, config: EngineConfig) -> Self {
        Self {
            source,
            config,
            _record: PhantomData,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetches a snapshot; a failed fetch yields an empty list.
    pub fn snapshot(&self) -> Vec<R> {
        match self.source.fetch() {
            Ok(records) => {
                debug!(
                    "event=snapshot_fetch module=service status=ok count={}",
                    records.len()
                );
                records
            }
            Err(err) => {
                warn!(
                    "event=snapshot_fetch module=service status=error kind={} fallback=empty",
                    err.kind()
                );
                Vec::new()
            }
        }
    }

    /// Query parameters seeded from this service's config.
    pub fn params(
        &self,
        criteria: Criteria<R::Category>,
    ) -> QueryParams<R::Category, R::SortField> {
        QueryParams::from_config(criteria, &self.config)
    }

    /// Fetches a fresh snapshot and runs `params` against it.
    pub fn query(&self, params: &QueryParams<R::Category, R::SortField>) -> QueryOutcome<R> {
        let records = self.snapshot();
        let outcome = run_query(&records, params).into_owned();
        log_outcome(&outcome, records.len());
        outcome
    }

    /// Like [`DashboardService::query`], joining against `lookup`.
    pub fn query_linked(
        &self,
        params: &QueryParams<R::Category, R::SortField>,
        lookup: &dyn LinkLookup,
    ) -> QueryOutcome<R> {
        let records = self.snapshot();
        let outcome = run_query_with(&records, params, lookup).into_owned();
        log_outcome(&outcome, records.len());
        outcome
    }
}

fn log_outcome<R>(outcome: &QueryOutcome<R>, snapshot_len: usize) {
    debug!(
        "event=query_run module=service status=ok snapshot={} matched={} page={}/{}",
        snapshot_len,
        outcome.summary.count,
        outcome.page.page_number,
        outcome.page.total_pages
    );
}
