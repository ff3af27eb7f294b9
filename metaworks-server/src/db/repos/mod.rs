//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Saves are `ON CONFLICT` upserts on the natural key
//! - JOINs for listings that need parent names (no N+1)
//! - Transactions for multi-step writes

pub mod assessments;
pub mod company;
pub mod files;
pub mod frameworks;
pub mod policies;
pub mod remediation;
pub mod risks;
pub mod sessions;
pub mod users;

pub use assessments::{Assessment, AssessmentRepo, AssessmentResult};
pub use company::{CompanyInfo, CompanyRepo};
pub use files::{FileRepo, StoredFile};
pub use frameworks::{Control, Domain, Framework, FrameworkRepo};
pub use policies::{Policy, PolicyRepo};
pub use remediation::{RemediationRepo, RemediationTask};
pub use risks::{Risk, RiskRepo};
pub use sessions::SessionRepo;
pub use users::{User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} '{id}' already exists")]
    Conflict { resource: &'static str, id: String },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Turn a unique violation into `Conflict`; other errors pass through.
    pub(crate) fn on_unique(e: sqlx::Error, resource: &'static str, id: impl ToString) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict {
                resource,
                id: id.to_string(),
            },
            _ => Self::Sqlx(e),
        }
    }

    /// Turn a foreign key violation into `NotFound` for the referenced row.
    pub(crate) fn on_missing_parent(
        e: sqlx::Error,
        resource: &'static str,
        id: impl ToString,
    ) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => Self::NotFound {
                resource,
                id: id.to_string(),
            },
            _ => Self::Sqlx(e),
        }
    }

    /// Like `on_missing_parent` for rows with several foreign keys. Each
    /// parent is `(fk column, resource, id)`; the violated constraint name
    /// (`<table>_<column>_fkey`) picks which one is reported.
    pub(crate) fn on_missing_parents(e: sqlx::Error, parents: &[(&str, &'static str, String)]) -> Self {
        let missing = match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                let constraint = db.constraint().unwrap_or_default();
                missing_parent(constraint, parents)
            }
            _ => None,
        };
        match missing {
            Some((_, resource, id)) => Self::NotFound {
                resource: *resource,
                id: id.clone(),
            },
            None => Self::Sqlx(e),
        }
    }
}

/// The parent whose column appears in the constraint name, else the first.
fn missing_parent<'p, 'c>(
    constraint: &str,
    parents: &'p [(&'c str, &'static str, String)],
) -> Option<&'p (&'c str, &'static str, String)> {
    parents
        .iter()
        .find(|(column, _, _)| constraint.ends_with(&format!("_{column}_fkey")))
        .or_else(|| parents.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_pass_through() {
        let err = DbError::on_unique(sqlx::Error::RowNotFound, "user", "alice");
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));

        let err = DbError::on_missing_parent(sqlx::Error::RowNotFound, "control", 7);
        assert!(matches!(err, DbError::Sqlx(_)));
    }

    #[test]
    fn missing_parent_picked_by_constraint() {
        let parents = [
            ("framework_id", "framework", "3".to_string()),
            ("company_id", "company", "999".to_string()),
        ];
        let (_, resource, id) =
            missing_parent("assessments_company_id_fkey", &parents).unwrap();
        assert_eq!((*resource, id.as_str()), ("company", "999"));

        let (_, resource, _) =
            missing_parent("assessments_framework_id_fkey", &parents).unwrap();
        assert_eq!(*resource, "framework");

        let (_, resource, _) = missing_parent("", &parents).unwrap();
        assert_eq!(*resource, "framework");

        let err = DbError::on_missing_parents(sqlx::Error::RowNotFound, &parents);
        assert!(matches!(err, DbError::Sqlx(_)));
    }

    #[test]
    fn not_found_display() {
        assert_eq!(
            DbError::not_found("risk", 12).to_string(),
            "not found: risk '12'"
        );
    }
}
