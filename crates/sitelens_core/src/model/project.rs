//! Project record as listed by the projects dashboard.
//!
//! # Invariants
//! - `budget` reads through [`ProjectRecord::budget`], which is never negative.
//! - Unknown status labels decode to [`ProjectStatus::Unknown`].
//! - Unknown priority labels decode to `None`.

use crate::model::level::{self, Level};
use crate::model::numeric::Amount;
use crate::model::{non_blank, null_as_default, RecordId};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    InProgress,
    Completed,
    OnHold,
    Cancelled,
    Planning,
    #[default]
    Unknown,
}

impl ProjectStatus {
    /// Parses the labels the API and UI use for statuses.
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "inprogress" | "active" | "ongoing" | "enprogreso" | "enproceso" => Self::InProgress,
            "completed" | "complete" | "done" | "finished" | "completado" | "finalizado" => {
                Self::Completed
            }
            "onhold" | "paused" | "suspended" | "enpausa" | "pausado" => Self::OnHold,
            "cancelled" | "canceled" | "cancelado" => Self::Cancelled,
            "planning" | "planned" | "planificacion" | "planificado" => Self::Planning,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Cancelled => "cancelled",
            Self::Planning => "planning",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProjectStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// Issue reported against a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Issue {
    pub id: RecordId,
    pub title: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "level::deserialize_lenient")]
    pub priority: Option<Level>,
}

impl Issue {
    /// An issue is open unless its status says it was resolved.
    pub fn is_open(&self) -> bool {
        let Some(status) = non_blank(self.status.as_deref()) else {
            return true;
        };
        !matches!(
            status.to_lowercase().as_str(),
            "resolved" | "closed" | "done" | "fixed" | "resuelto" | "cerrado"
        )
    }
}

/// Project snapshot from the projects endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectRecord {
    pub id: RecordId,
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub observations: Option<String>,
    /// Serialized as `type` to match the API schema.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub code: Option<String>,
    pub status: ProjectStatus,
    #[serde(deserialize_with = "level::deserialize_lenient")]
    pub priority: Option<Level>,
    pub budget: Amount,
    pub created_at: Option<String>,
    pub end_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub issues: Vec<Issue>,
}

impl ProjectRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: RecordId(id.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Normalized budget, never negative.
    pub fn budget(&self) -> f64 {
        self.budget.non_negative()
    }
}

#[cfg(test)]
mod tests {
    use super::{Issue, ProjectRecord, ProjectStatus};
    use crate::model::level::Level;

    #[test]
    fn status_parse_accepts_common_spellings() {
        assert_eq!(ProjectStatus::parse("In Progress"), ProjectStatus::InProgress);
        assert_eq!(ProjectStatus::parse("inProgress"), ProjectStatus::InProgress);
        assert_eq!(ProjectStatus::parse("on_hold"), ProjectStatus::OnHold);
        assert_eq!(ProjectStatus::parse("Canceled"), ProjectStatus::Cancelled);
        assert_eq!(ProjectStatus::parse("archived"), ProjectStatus::Unknown);
    }

    #[test]
    fn decode_tolerates_nulls_and_garbage() {
        let record: ProjectRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Bridge",
            "status": null,
            "priority": "HIGH",
            "budget": "$12,500.00",
            "issues": null
        }))
        .unwrap();

        assert_eq!(record.id.as_str(), "7");
        assert_eq!(record.status, ProjectStatus::Unknown);
        assert_eq!(record.priority, Some(Level::High));
        assert_eq!(record.budget(), 12_500.0);
        assert!(record.issues.is_empty());
    }

    #[test]
    fn issue_without_status_is_open() {
        let mut issue = Issue::default();
        assert!(issue.is_open());
        issue.status = Some("Resolved".to_string());
        assert!(!issue.is_open());
    }
}
