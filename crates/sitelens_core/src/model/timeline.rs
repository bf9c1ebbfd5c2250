//! Timeline entry: one day of work logged against a project.
//!
//! # Invariants
//! - Missing sub-collections decode to empty lists.
//! - A missing `projectSummary` degrades every read to "unknown"/empty.
//! - Explicit staff counts win over sub-collection lengths when sent.

use crate::model::numeric::Amount;
use crate::model::project::ProjectStatus;
use crate::model::{non_blank, null_as_default, RecordId};
use serde::{Deserialize, Serialize};

/// Denormalized project fields embedded in a timeline entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSummary {
    pub name: Option<String>,
    pub code: Option<String>,
    pub status: ProjectStatus,
    pub location: Option<String>,
    #[serde(alias = "responsible", alias = "manager")]
    pub owner: Option<String>,
}

/// Worker, engineer or architect present on the day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaffMember {
    pub name: Option<String>,
    #[serde(alias = "specialty", alias = "role")]
    pub specialty_or_role: Option<String>,
    pub hours_worked: Amount,
}

impl StaffMember {
    pub fn new(name: &str, role: &str, hours: impl Into<Amount>) -> Self {
        Self {
            name: Some(name.to_string()),
            specialty_or_role: Some(role.to_string()),
            hours_worked: hours.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Material {
    pub name: Option<String>,
    pub quantity: Amount,
    pub cost: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tool {
    pub name: Option<String>,
    pub quantity: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Expense {
    pub amount: Amount,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Staff group a [`StaffMember`] was listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffGroup {
    Worker,
    Engineer,
    Architect,
}

impl StaffGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Engineer => "engineer",
            Self::Architect => "architect",
        }
    }
}

/// Timeline snapshot from the timelines endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineRecord {
    pub id: RecordId,
    pub project_code: Option<String>,
    #[serde(alias = "project")]
    pub project_summary: Option<ProjectSummary>,
    pub date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub workers: Vec<StaffMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub engineers: Vec<StaffMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub architects: Vec<StaffMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub materials: Vec<Material>,
    #[serde(deserialize_with = "null_as_default")]
    pub tools: Vec<Tool>,
    #[serde(deserialize_with = "null_as_default")]
    pub expenses: Vec<Expense>,
    pub notes: Option<String>,
    pub worker_count: Amount,
    pub engineer_count: Amount,
    pub architect_count: Amount,
}

impl TimelineRecord {
    pub fn new(id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: RecordId(id.into()),
            date: Some(date.into()),
            ..Self::default()
        }
    }

    /// Foreign key to the owning project, falling back to the embedded summary.
    pub fn project_code(&self) -> Option<&str> {
        non_blank(self.project_code.as_deref()).or_else(|| {
            self.project_summary
                .as_ref()
                .and_then(|summary| non_blank(summary.code.as_deref()))
        })
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_summary
            .as_ref()
            .and_then(|summary| non_blank(summary.name.as_deref()))
    }

    pub fn project_location(&self) -> Option<&str> {
        self.project_summary
            .as_ref()
            .and_then(|summary| non_blank(summary.location.as_deref()))
    }

    /// Status of the owning project; `Unknown` without a summary.
    pub fn project_status(&self) -> ProjectStatus {
        self.project_summary
            .as_ref()
            .map(|summary| summary.status)
            .unwrap_or_default()
    }

    pub fn has_notes(&self) -> bool {
        non_blank(self.notes.as_deref()).is_some()
    }

    /// Every staff member with the group it was listed under.
    pub fn staff(&self) -> impl Iterator<Item = (StaffGroup, &StaffMember)> + '_ {
        let workers = self.workers.iter().map(|m| (StaffGroup::Worker, m));
        let engineers = self.engineers.iter().map(|m| (StaffGroup::Engineer, m));
        let architects = self.architects.iter().map(|m| (StaffGroup::Architect, m));
        workers.chain(engineers).chain(architects)
    }
}

#[cfg(test)]
mod tests {
    use super::{ProjectSummary, TimelineRecord};
    use crate::model::project::ProjectStatus;

    #[test]
    fn decode_defaults_missing_lists_and_summary() {
        let record: TimelineRecord = serde_json::from_value(serde_json::json!({
            "id": "t-1",
            "date": "2024-05-01",
            "workers": null,
            "materials": [{ "name": "cement", "cost": "1,200" }]
        }))
        .unwrap();

        assert!(record.workers.is_empty());
        assert!(record.expenses.is_empty());
        assert_eq!(record.materials[0].cost.value(), 1_200.0);
        assert_eq!(record.project_status(), ProjectStatus::Unknown);
        assert!(record.project_name().is_none());
    }

    #[test]
    fn project_code_falls_back_to_summary() {
        let mut record = TimelineRecord::new("t-2", "2024-05-02");
        record.project_summary = Some(ProjectSummary {
            code: Some("PRJ-9".to_string()),
            ..ProjectSummary::default()
        });
        assert_eq!(record.project_code(), Some("PRJ-9"));

        record.project_code = Some("PRJ-1".to_string());
        assert_eq!(record.project_code(), Some("PRJ-1"));
    }

    #[test]
    fn staff_role_aliases_decode() {
        let record: TimelineRecord = serde_json::from_value(serde_json::json!({
            "workers": [{ "name": "Ana", "specialty": "mason", "hoursWorked": "8" }],
            "engineers": [{ "name": "Luis", "role": "structural", "hoursWorked": 6 }]
        }))
        .unwrap();

        let roles: Vec<_> = record
            .staff()
            .map(|(_, member)| member.specialty_or_role.clone().unwrap_or_default())
            .collect();
        assert_eq!(roles, vec!["mason", "structural"]);
    }
}
