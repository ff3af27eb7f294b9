//! Policy document payloads

use serde::Deserialize;

use super::validation::{optional, required};
use super::ValidationError;

const DEFAULT_TITLE: &str = "Untitled Policy";
const DEFAULT_TYPE: &str = "general";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRequest {
    /// Present when updating an existing policy
    pub id: Option<i32>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub policy_type: Option<String>,
    pub content: Option<String>,
    pub file_id: Option<i32>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDraft {
    pub id: Option<i32>,
    pub title: String,
    pub policy_type: String,
    pub content: Option<String>,
    pub file_id: Option<i32>,
    pub version: Option<String>,
}

impl TryFrom<PolicyRequest> for PolicyDraft {
    type Error = ValidationError;

    fn try_from(req: PolicyRequest) -> Result<Self, Self::Error> {
        let title = optional("title", req.title, 200)?.unwrap_or_else(|| DEFAULT_TITLE.into());
        let policy_type = match req.policy_type {
            Some(t) if !t.trim().is_empty() => required("type", &t, 1, 64)?,
            _ => DEFAULT_TYPE.to_string(),
        };

        Ok(Self {
            id: req.id,
            title,
            policy_type,
            content: req.content,
            file_id: req.file_id,
            version: optional("version", req.version, 32)?,
        })
    }
}
