//! metaworks-core: compliance vocabulary shared by the server and CLI
//!
//! - `compliance`: control status aggregation and report building
//! - `risk`: heat-map banding for domain risk levels
//! - `mascot`: prompt construction for the security mascot
//! - `config`: TOML configuration with environment overrides

pub mod compliance;
pub mod config;
pub mod error;
pub mod mascot;
pub mod risk;

pub use compliance::{
    build_report, chart_data, compliance_score, summarize, unique_domains, AssessmentEntry,
    ChartData, ComplianceReport, ComplianceSummary, ControlStatus, DomainBar, Priority,
    ReportFilter, StatusCounts, StatusSlice,
};
pub use config::AppConfig;
pub use error::{CoreError, Result};
pub use mascot::{MascotPrompt, Personality};
pub use risk::{domain_heat, DomainHeat, RiskBand};
