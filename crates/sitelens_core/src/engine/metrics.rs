//! Metric Deriver: scalar metrics computed from a record's sub-collections.
//!
//! # Invariants
//! - Pure function of record content; nothing is cached on the record.
//! - Every summation term is coerced and clamped at zero, so totals are
//!   never negative.
//! - Efficiency divides by `max(total_staff, 1)`.

use crate::model::level::Level;
use crate::model::numeric::Amount;
use crate::model::project::ProjectRecord;
use crate::model::timeline::{StaffMember, TimelineRecord};
use serde::Serialize;

pub const RISK_HIGH_COST: f64 = 15_000.0;
pub const RISK_MEDIUM_COST: f64 = 8_000.0;
pub const ACTIVITY_HIGH_STAFF: f64 = 15.0;
pub const ACTIVITY_MEDIUM_STAFF: f64 = 8.0;
pub const EFFICIENCY_FLOOR: f64 = 50.0;
pub const EFFICIENCY_CEILING: f64 = 100.0;
const EFFICIENCY_SCALE: f64 = 10.0;

/// Derived metrics for a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    pub budget: f64,
    pub issue_count: usize,
    pub open_issue_count: usize,
    pub risk_level: Level,
}

/// Derived metrics for a timeline entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMetrics {
    pub total_cost: f64,
    pub total_hours: f64,
    pub worker_count: f64,
    pub engineer_count: f64,
    pub architect_count: f64,
    pub total_staff: f64,
    pub efficiency: f64,
    pub risk_level: Level,
    pub activity_level: Level,
}

pub fn derive_project_metrics(record: &ProjectRecord) -> ProjectMetrics {
    let budget = record.budget();
    ProjectMetrics {
        budget,
        issue_count: record.issues.len(),
        open_issue_count: record.issues.iter().filter(|issue| issue.is_open()).count(),
        risk_level: Level::classify(budget, RISK_HIGH_COST, RISK_MEDIUM_COST),
    }
}

pub fn derive_timeline_metrics(record: &TimelineRecord) -> TimelineMetrics {
    let material_cost: f64 = record.materials.iter().map(|m| m.cost.non_negative()).sum();
    let expense_cost: f64 = record.expenses.iter().map(|e| e.amount.non_negative()).sum();
    let total_cost = material_cost + expense_cost;

    let total_hours = group_hours(&record.workers)
        + group_hours(&record.engineers)
        + group_hours(&record.architects);

    let worker_count = staff_count(&record.worker_count, record.workers.len());
    let engineer_count = staff_count(&record.engineer_count, record.engineers.len());
    let architect_count = staff_count(&record.architect_count, record.architects.len());
    let total_staff = worker_count + engineer_count + architect_count;

    TimelineMetrics {
        total_cost,
        total_hours,
        worker_count,
        engineer_count,
        architect_count,
        total_staff,
        efficiency: efficiency(total_hours, total_staff),
        risk_level: Level::classify(total_cost, RISK_HIGH_COST, RISK_MEDIUM_COST),
        activity_level: Level::classify(total_staff, ACTIVITY_HIGH_STAFF, ACTIVITY_MEDIUM_STAFF),
    }
}

/// Hours per staff member scaled to a 50..=100 band.
pub fn efficiency(total_hours: f64, total_staff: f64) -> f64 {
    let divisor = total_staff.max(1.0);
    (total_hours / divisor * EFFICIENCY_SCALE).clamp(EFFICIENCY_FLOOR, EFFICIENCY_CEILING)
}

fn group_hours(members: &[StaffMember]) -> f64 {
    members.iter().map(|m| m.hours_worked.non_negative()).sum()
}

fn staff_count(explicit: &Amount, listed: usize) -> f64 {
    if explicit.is_present() {
        explicit.non_negative()
    } else {
        listed as f64
    }
}
