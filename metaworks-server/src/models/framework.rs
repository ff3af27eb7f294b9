//! Framework, domain and control reference data

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::validation::{optional, required};
use super::ValidationError;

/// Matches DB usage: ^[a-z0-9][a-z0-9_-]{0,63}$
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").expect("invalid slug regex"));

/// Control codes such as "1.1.1" or "ECC-2-3-1"
static CONTROL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,31}$").expect("invalid code regex"));

const MAX_TEXT: usize = 20_000;

/// Validate a machine name ("nca-ecc").
pub fn slug(field: &'static str, s: &str) -> Result<String, ValidationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if !SLUG_RE.is_match(s) {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "must be lowercase alphanumeric with hyphens/underscores, starting with alphanumeric",
        });
    }
    Ok(s.to_owned())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkRequest {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkDraft {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

impl TryFrom<FrameworkRequest> for FrameworkDraft {
    type Error = ValidationError;

    fn try_from(req: FrameworkRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: slug("framework name", &req.name)?,
            display_name: required("display name", &req.display_name, 1, 200)?,
            description: optional("description", req.description, MAX_TEXT)?,
            version: optional("version", req.version, 32)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRequest {
    pub framework_id: i32,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainDraft {
    pub framework_id: i32,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

impl TryFrom<DomainRequest> for DomainDraft {
    type Error = ValidationError;

    fn try_from(req: DomainRequest) -> Result<Self, Self::Error> {
        if req.order < 0 {
            return Err(ValidationError::OutOfRange {
                field: "order",
                min: 0,
                max: i32::MAX as i64,
            });
        }
        Ok(Self {
            framework_id: req.framework_id,
            name: slug("domain name", &req.name)?,
            display_name: required("display name", &req.display_name, 1, 200)?,
            description: optional("description", req.description, MAX_TEXT)?,
            sort_order: req.order,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRequest {
    pub domain_id: i32,
    /// Framework control code, e.g. "1.1.1"
    #[serde(alias = "controlId")]
    pub control_code: String,
    pub name: String,
    pub description: Option<String>,
    pub guidance: Option<String>,
    pub maturity_level: Option<String>,
    pub reference_links: Option<String>,
    pub implementation_guide: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlDraft {
    pub domain_id: i32,
    pub control_code: String,
    pub name: String,
    pub description: Option<String>,
    pub guidance: Option<String>,
    pub maturity_level: Option<String>,
    pub reference_links: Option<String>,
    pub implementation_guide: Option<String>,
}

impl TryFrom<ControlRequest> for ControlDraft {
    type Error = ValidationError;

    fn try_from(req: ControlRequest) -> Result<Self, Self::Error> {
        let code = req.control_code.trim();
        if code.is_empty() {
            return Err(ValidationError::Empty {
                field: "control code",
            });
        }
        if !CONTROL_CODE_RE.is_match(code) {
            return Err(ValidationError::InvalidFormat {
                field: "control code",
                reason: "letters, digits, '.', '_' and '-' only (max 32)",
            });
        }

        Ok(Self {
            domain_id: req.domain_id,
            control_code: code.to_owned(),
            name: required("control name", &req.name, 1, 500)?,
            description: optional("description", req.description, MAX_TEXT)?,
            guidance: optional("guidance", req.guidance, MAX_TEXT)?,
            maturity_level: optional("maturity level", req.maturity_level, 32)?,
            reference_links: optional("reference links", req.reference_links, MAX_TEXT)?,
            implementation_guide: optional("implementation guide", req.implementation_guide, MAX_TEXT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framework_slug() {
        assert!(slug("name", "nca-ecc").is_ok());
        assert!(slug("name", "NCA ECC").is_err());
        assert!(slug("name", "-ecc").is_err());
        assert!(slug("name", &"a".repeat(65)).is_err());
    }

    #[test]
    fn control_code_alias() {
        let req: ControlRequest = serde_json::from_str(
            r#"{"domainId": 1, "controlId": "1.1.1", "name": "Cybersecurity strategy"}"#,
        )
        .unwrap();
        let draft = ControlDraft::try_from(req).unwrap();
        assert_eq!(draft.control_code, "1.1.1");
        assert_eq!(draft.guidance, None);
    }

    #[test]
    fn control_code_rejects_spaces() {
        let req: ControlRequest = serde_json::from_str(
            r#"{"domainId": 1, "controlCode": "1 1", "name": "x"}"#,
        )
        .unwrap();
        assert!(matches!(
            ControlDraft::try_from(req),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn negative_domain_order_rejected() {
        let req: DomainRequest = serde_json::from_str(
            r#"{"frameworkId": 1, "name": "governance", "displayName": "Governance", "order": -1}"#,
        )
        .unwrap();
        assert!(matches!(
            DomainDraft::try_from(req),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
