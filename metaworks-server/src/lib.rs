//! metaworks-server: HTTP API for the MetaWorks compliance platform
//!
//! Session-authenticated JSON CRUD over Postgres for company info, policies,
//! the risk register, frameworks/domains/controls, assessments and
//! remediation tasks, plus the compliance report built by `metaworks-core`.

pub mod db;
pub mod http;
pub mod integrations;
pub mod models;

pub use http::{build_router, run_server, AppState, ServerConfig};
