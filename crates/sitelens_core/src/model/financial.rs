//! Sibling financial dataset used for cross-reference enrichment.

use crate::model::numeric::Amount;
use crate::model::RecordId;
use serde::{Deserialize, Serialize};

/// One row of the financial dashboard, keyed by project code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialRecord {
    pub id: RecordId,
    #[serde(alias = "code")]
    pub project_code: Option<String>,
    #[serde(alias = "financialValue", alias = "amount")]
    pub value: Amount,
}

impl FinancialRecord {
    pub fn new(project_code: &str, value: impl Into<Amount>) -> Self {
        Self {
            id: RecordId::default(),
            project_code: Some(project_code.to_string()),
            value: value.into(),
        }
    }
}
