//! Assessment lifecycle and per-control result payloads

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use metaworks_core::{ControlStatus, Priority, ReportFilter};
use serde::{Deserialize, Serialize};

use super::validation::{optional, required, variant};
use super::ValidationError;

const MAX_TEXT: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for AssessmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "draft" => Ok(Self::Draft),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ValidationError::InvalidVariant {
                field: "assessment status",
                value: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for AssessmentStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssessmentRequest {
    pub company_id: Option<i32>,
    pub framework_id: i32,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAssessment {
    pub company_id: Option<i32>,
    pub framework_id: i32,
    pub name: String,
    pub start_date: DateTime<Utc>,
}

impl TryFrom<CreateAssessmentRequest> for NewAssessment {
    type Error = ValidationError;

    fn try_from(req: CreateAssessmentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            company_id: req.company_id,
            framework_id: req.framework_id,
            name: required("assessment name", &req.name, 1, 200)?,
            start_date: req.start_date.unwrap_or_else(Utc::now),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub score: Option<i32>,
}

/// Validated status transition. `score: None` on completion means
/// "derive it from the stored results".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: AssessmentStatus,
    pub score: Option<i32>,
}

impl TryFrom<StatusUpdateRequest> for StatusUpdate {
    type Error = ValidationError;

    fn try_from(req: StatusUpdateRequest) -> Result<Self, Self::Error> {
        let status = req.status.parse()?;
        if let Some(score) = req.score {
            if !(0..=100).contains(&score) {
                return Err(ValidationError::OutOfRange {
                    field: "score",
                    min: 0,
                    max: 100,
                });
            }
        }
        Ok(Self {
            status,
            score: req.score,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    pub control_id: i32,
    pub status: String,
    pub priority: Option<String>,
    pub evidence: Option<String>,
    pub comments: Option<String>,
    pub recommendation: Option<String>,
    pub management_response: Option<String>,
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultDraft {
    pub control_id: i32,
    pub status: ControlStatus,
    pub priority: Priority,
    pub evidence: Option<String>,
    pub comments: Option<String>,
    pub recommendation: Option<String>,
    pub management_response: Option<String>,
    pub target_date: Option<String>,
}

impl TryFrom<ResultRequest> for ResultDraft {
    type Error = ValidationError;

    fn try_from(req: ResultRequest) -> Result<Self, Self::Error> {
        let priority = match req.priority.as_deref() {
            Some(p) if !p.trim().is_empty() => variant("priority", p)?,
            _ => Priority::default(),
        };
        Ok(Self {
            control_id: req.control_id,
            status: variant("control status", &req.status)?,
            priority,
            evidence: optional("evidence", req.evidence, MAX_TEXT)?,
            comments: optional("comments", req.comments, MAX_TEXT)?,
            recommendation: optional("recommendation", req.recommendation, MAX_TEXT)?,
            management_response: optional("management response", req.management_response, MAX_TEXT)?,
            target_date: optional("target date", req.target_date, 64)?,
        })
    }
}

/// `?domain=&priority=` on the report route
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub domain: Option<String>,
    pub priority: Option<String>,
}

impl TryFrom<ReportQuery> for ReportFilter {
    type Error = ValidationError;

    fn try_from(query: ReportQuery) -> Result<Self, Self::Error> {
        let priority = match query.priority.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(p) => Some(variant("priority", p)?),
        };
        let domain = match query.domain.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(d) => Some(d.to_owned()),
        };
        Ok(ReportFilter { domain, priority })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing() {
        assert_eq!("in_progress".parse::<AssessmentStatus>().unwrap(), AssessmentStatus::InProgress);
        assert_eq!("In Progress".parse::<AssessmentStatus>().unwrap(), AssessmentStatus::InProgress);
        assert!("archived".parse::<AssessmentStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&AssessmentStatus::Completed).unwrap(),
            r#""completed""#
        );
    }

    #[test]
    fn score_out_of_range() {
        let req = StatusUpdateRequest {
            status: "completed".into(),
            score: Some(101),
        };
        assert!(matches!(
            StatusUpdate::try_from(req),
            Err(ValidationError::OutOfRange { field: "score", .. })
        ));
    }

    #[test]
    fn result_accepts_label_status() {
        let req: ResultRequest = serde_json::from_str(
            r#"{"controlId": 3, "status": "Partially Implemented", "priority": "high"}"#,
        )
        .unwrap();
        let draft = ResultDraft::try_from(req).unwrap();
        assert_eq!(draft.status, ControlStatus::PartiallyImplemented);
        assert_eq!(draft.priority, Priority::High);
    }

    #[test]
    fn result_defaults_priority() {
        let req: ResultRequest =
            serde_json::from_str(r#"{"controlId": 3, "status": "not_applicable"}"#).unwrap();
        assert_eq!(ResultDraft::try_from(req).unwrap().priority, Priority::Medium);
    }

    #[test]
    fn report_query_all_means_unfiltered() {
        let query = ReportQuery {
            domain: Some("all".into()),
            priority: Some("all".into()),
        };
        assert!(ReportFilter::try_from(query).unwrap().is_empty());

        let query = ReportQuery {
            domain: None,
            priority: Some("urgent".into()),
        };
        assert!(ReportFilter::try_from(query).is_err());
    }
}
