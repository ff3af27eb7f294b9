//! Company profile payloads

use serde::Deserialize;

use super::validation::{optional, required};
use super::ValidationError;

const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfoRequest {
    pub company_name: String,
    pub ceo_name: Option<String>,
    pub cio_name: Option<String>,
    pub cto_name: Option<String>,
    pub ciso_name: Option<String>,
    pub logo_id: Option<i32>,
    #[serde(default)]
    pub cybersecurity_staff: Option<Vec<String>>,
}

/// Validated company profile. `None` officer fields keep the stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyUpdate {
    pub company_name: String,
    pub ceo_name: Option<String>,
    pub cio_name: Option<String>,
    pub cto_name: Option<String>,
    pub ciso_name: Option<String>,
    pub logo_id: Option<i32>,
    /// Replacement staff list; `None` leaves the current staff untouched
    pub staff: Option<Vec<String>>,
}

impl TryFrom<CompanyInfoRequest> for CompanyUpdate {
    type Error = ValidationError;

    fn try_from(req: CompanyInfoRequest) -> Result<Self, Self::Error> {
        let staff = match req.cybersecurity_staff {
            Some(names) => {
                let mut kept = Vec::with_capacity(names.len());
                for name in names {
                    if let Some(name) = optional("staff name", Some(name), MAX_NAME_LEN)? {
                        kept.push(name);
                    }
                }
                // An all-blank list leaves the stored staff as-is.
                (!kept.is_empty()).then_some(kept)
            }
            None => None,
        };

        Ok(Self {
            company_name: required("company name", &req.company_name, 1, MAX_NAME_LEN)?,
            ceo_name: optional("CEO name", req.ceo_name, MAX_NAME_LEN)?,
            cio_name: optional("CIO name", req.cio_name, MAX_NAME_LEN)?,
            cto_name: optional("CTO name", req.cto_name, MAX_NAME_LEN)?,
            ciso_name: optional("CISO name", req.ciso_name, MAX_NAME_LEN)?,
            logo_id: req.logo_id,
            staff,
        })
    }
}
