//! Marketing-site form submissions

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::validation::{optional, required};
use super::ValidationError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex")
});

pub fn email(value: &str) -> Result<String, ValidationError> {
    let value = required("email", value, 3, 254)?;
    if !EMAIL_RE.is_match(&value) {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "must be a valid email address",
        });
    }
    Ok(value)
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl TryFrom<ContactRequest> for ContactMessage {
    type Error = ValidationError;

    fn try_from(req: ContactRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required("name", &req.name, 1, 200)?,
            email: email(&req.email)?,
            message: required("message", &req.message, 1, 5_000)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DemoRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub company: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoBooking {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: Option<String>,
}

impl TryFrom<DemoRequest> for DemoBooking {
    type Error = ValidationError;

    fn try_from(req: DemoRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required("name", &req.name, 1, 200)?,
            email: email(&req.email)?,
            company: optional("company", req.company, 200)?,
            message: optional("message", req.message, 5_000)?,
        })
    }
}
