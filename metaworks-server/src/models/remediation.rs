//! Remediation task payloads

use std::fmt;
use std::str::FromStr;

use metaworks_core::Priority;
use serde::{Deserialize, Serialize};

use super::validation::{optional, required, variant};
use super::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ValidationError::InvalidVariant {
                field: "task status",
                value: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub control_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub control_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
    pub external_id: Option<String>,
}

impl TryFrom<TaskRequest> for TaskDraft {
    type Error = ValidationError;

    fn try_from(req: TaskRequest) -> Result<Self, Self::Error> {
        let status = match req.status.as_deref() {
            Some(s) if !s.trim().is_empty() => s.parse()?,
            _ => TaskStatus::default(),
        };
        let priority = match req.priority.as_deref() {
            Some(p) if !p.trim().is_empty() => variant("priority", p)?,
            _ => Priority::default(),
        };
        Ok(Self {
            control_id: req.control_id,
            title: required("task title", &req.title, 1, 200)?,
            description: optional("description", req.description, 10_000)?,
            status,
            priority,
            assigned_to: optional("assigned to", req.assigned_to, 200)?,
            due_date: optional("due date", req.due_date, 64)?,
            external_id: optional("external id", req.external_id, 128)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_defaults() {
        let req: TaskRequest =
            serde_json::from_str(r#"{"controlId": 9, "title": "Enable MFA"}"#).unwrap();
        let draft = TaskDraft::try_from(req).unwrap();
        assert_eq!(draft.status, TaskStatus::Open);
        assert_eq!(draft.priority, Priority::Medium);
    }

    #[test]
    fn unknown_task_status() {
        assert!(matches!(
            "closed".parse::<TaskStatus>(),
            Err(ValidationError::InvalidVariant { .. })
        ));
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
    }
}
