//! Field selectors a UI sends for sorting and categorical filtering.
//!
//! Names parse from the camelCase identifiers the dashboards use, so a
//! select box value can be handed over unchanged.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Unknown selector text coming from the calling layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown sort field `{0}`")]
    SortField(String),
    #[error("unknown category field `{0}`")]
    CategoryField(String),
    #[error("unknown sort direction `{0}`; expected asc|desc")]
    Direction(String),
    #[error("unknown quick filter `{0}`")]
    QuickFilter(String),
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !matches!(ch, '_' | '-' | ' '))
        .collect::<String>()
        .to_ascii_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectSortField {
    Name,
    Status,
    Priority,
    CreatedAt,
    EndDate,
    Budget,
    IssueCount,
}

impl FromStr for ProjectSortField {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "name" => Ok(Self::Name),
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "createdat" | "created" | "date" => Ok(Self::CreatedAt),
            "enddate" => Ok(Self::EndDate),
            "budget" => Ok(Self::Budget),
            "issuecount" | "issues" => Ok(Self::IssueCount),
            _ => Err(ParseError::SortField(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimelineSortField {
    Date,
    ProjectName,
    ProjectCode,
    Status,
    TotalCost,
    TotalHours,
    TotalStaff,
    Efficiency,
    WorkerCount,
}

impl FromStr for TimelineSortField {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "date" => Ok(Self::Date),
            "projectname" | "project" => Ok(Self::ProjectName),
            "projectcode" | "code" => Ok(Self::ProjectCode),
            "status" => Ok(Self::Status),
            "totalcost" | "cost" => Ok(Self::TotalCost),
            "totalhours" | "hours" => Ok(Self::TotalHours),
            "totalstaff" | "staff" => Ok(Self::TotalStaff),
            "efficiency" => Ok(Self::Efficiency),
            "workercount" | "workers" => Ok(Self::WorkerCount),
            _ => Err(ParseError::SortField(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectCategory {
    Status,
    Type,
    Priority,
    Location,
}

impl FromStr for ProjectCategory {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "status" => Ok(Self::Status),
            "type" | "kind" => Ok(Self::Type),
            "priority" => Ok(Self::Priority),
            "location" => Ok(Self::Location),
            _ => Err(ParseError::CategoryField(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimelineCategory {
    ProjectCode,
    Status,
    Location,
    RiskLevel,
    ActivityLevel,
}

impl FromStr for TimelineCategory {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "projectcode" | "project" | "code" => Ok(Self::ProjectCode),
            "status" => Ok(Self::Status),
            "location" => Ok(Self::Location),
            "risklevel" | "risk" => Ok(Self::RiskLevel),
            "activitylevel" | "activity" => Ok(Self::ActivityLevel),
            _ => Err(ParseError::CategoryField(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseError, ProjectSortField, TimelineCategory, TimelineSortField};

    #[test]
    fn parses_ui_identifiers() {
        assert_eq!("createdAt".parse(), Ok(ProjectSortField::CreatedAt));
        assert_eq!("total_cost".parse(), Ok(TimelineSortField::TotalCost));
        assert_eq!("projectCode".parse(), Ok(TimelineCategory::ProjectCode));
    }

    #[test]
    fn unknown_identifier_is_typed_error() {
        assert_eq!(
            "colour".parse::<ProjectSortField>(),
            Err(ParseError::SortField("colour".to_string()))
        );
    }
}
