//! Request payloads and their validated domain forms
//!
//! Each `*Request` is the raw JSON body; `TryFrom` turns it into a draft that
//! the repositories accept. Validation failures surface as HTTP 400.

pub mod assessment;
pub mod company;
pub mod contact;
pub mod framework;
pub mod policy;
pub mod remediation;
pub mod risk;
pub mod user;
pub mod validation;

pub use assessment::{
    AssessmentStatus, CreateAssessmentRequest, NewAssessment, ReportQuery, ResultDraft,
    ResultRequest, StatusUpdate, StatusUpdateRequest,
};
pub use company::{CompanyInfoRequest, CompanyUpdate};
pub use contact::{ContactMessage, ContactRequest, DemoBooking, DemoRequest};
pub use framework::{
    ControlDraft, ControlRequest, DomainDraft, DomainRequest, FrameworkDraft, FrameworkRequest,
};
pub use policy::{PolicyDraft, PolicyRequest};
pub use remediation::{TaskDraft, TaskRequest, TaskStatus, TaskStatusRequest};
pub use risk::{CompanyFilter, ImportRisksRequest, RiskDraft, RiskRequest};
pub use user::{CreateUserRequest, CredentialsRequest, NewUser, Password, Role, Username};
pub use validation::ValidationError;
