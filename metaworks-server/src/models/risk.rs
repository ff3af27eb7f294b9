//! Risk register payloads

use serde::Deserialize;

use super::validation::{optional, required};
use super::ValidationError;

const MAX_SHORT: usize = 200;
const MAX_LONG: usize = 10_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
    pub id: Option<i32>,
    pub company_id: Option<i32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub cause: Option<String>,
    #[serde(default)]
    pub category: String,
    pub owner: Option<String>,
    #[serde(default)]
    pub likelihood: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub inherent_risk_level: String,
    pub existing_controls: Option<String>,
    pub control_effectiveness: Option<String>,
    pub residual_risk_level: Option<String>,
    pub mitigation_actions: Option<String>,
    pub target_date: Option<String>,
    #[serde(default)]
    pub is_accepted: bool,
}

/// A validated risk register entry, ready to save.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskDraft {
    pub id: Option<i32>,
    pub company_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub cause: Option<String>,
    pub category: String,
    pub owner: Option<String>,
    pub likelihood: String,
    pub impact: String,
    pub inherent_risk_level: String,
    pub existing_controls: Option<String>,
    pub control_effectiveness: Option<String>,
    pub residual_risk_level: Option<String>,
    pub mitigation_actions: Option<String>,
    pub target_date: Option<String>,
    pub is_accepted: bool,
}

impl TryFrom<RiskRequest> for RiskDraft {
    type Error = ValidationError;

    fn try_from(req: RiskRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: req.id,
            company_id: req.company_id,
            title: required("title", &req.title, 3, MAX_SHORT)?,
            description: required("description", &req.description, 5, MAX_LONG)?,
            cause: optional("cause", req.cause, MAX_LONG)?,
            category: required("category", &req.category, 1, MAX_SHORT)?,
            owner: optional("owner", req.owner, MAX_SHORT)?,
            likelihood: required("likelihood", &req.likelihood, 1, MAX_SHORT)?,
            impact: required("impact", &req.impact, 1, MAX_SHORT)?,
            inherent_risk_level: required("inherent risk level", &req.inherent_risk_level, 1, MAX_SHORT)?,
            existing_controls: optional("existing controls", req.existing_controls, MAX_LONG)?,
            control_effectiveness: optional("control effectiveness", req.control_effectiveness, MAX_SHORT)?,
            residual_risk_level: optional("residual risk level", req.residual_risk_level, MAX_SHORT)?,
            mitigation_actions: optional("mitigation actions", req.mitigation_actions, MAX_LONG)?,
            target_date: optional("target date", req.target_date, 64)?,
            is_accepted: req.is_accepted,
        })
    }
}

/// Bulk import body. Rows stay raw JSON so one bad row cannot fail the batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRisksRequest {
    pub company_id: Option<i32>,
    pub risks: Vec<serde_json::Value>,
}

/// Query string for risk listings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    pub company_id: Option<i32>,
}
