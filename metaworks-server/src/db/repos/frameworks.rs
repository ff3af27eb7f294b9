//! Framework reference data: frameworks, their domains, and domain controls
//!
//! All three saves are upserts on their natural keys, so seeding the same
//! catalogue twice leaves one copy.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{ControlDraft, DomainDraft, FrameworkDraft};

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    pub id: i32,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: i32,
    pub framework_id: i32,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub id: i32,
    pub domain_id: i32,
    pub control_code: String,
    pub name: String,
    pub description: Option<String>,
    pub guidance: Option<String>,
    pub maturity_level: Option<String>,
    pub reference_links: Option<String>,
    pub implementation_guide: Option<String>,
}

const FRAMEWORK_COLUMNS: &str =
    "id, name, display_name, description, version, created_at, updated_at";
const DOMAIN_COLUMNS: &str = "id, framework_id, name, display_name, description, sort_order";
const CONTROL_COLUMNS: &str = "id, domain_id, control_code, name, description, guidance, \
    maturity_level, reference_links, implementation_guide";

pub struct FrameworkRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> FrameworkRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Framework>, DbError> {
        let frameworks = sqlx::query_as(&format!(
            "SELECT {FRAMEWORK_COLUMNS} FROM frameworks ORDER BY display_name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(frameworks)
    }

    pub async fn get(&self, id: i32) -> Result<Framework, DbError> {
        sqlx::query_as(&format!("SELECT {FRAMEWORK_COLUMNS} FROM frameworks WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("framework", id))
    }

    pub async fn upsert(&self, draft: &FrameworkDraft) -> Result<Framework, DbError> {
        let framework = sqlx::query_as(&format!(
            r#"
            INSERT INTO frameworks (name, display_name, description, version)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                description = EXCLUDED.description,
                version = EXCLUDED.version,
                updated_at = NOW()
            RETURNING {FRAMEWORK_COLUMNS}
            "#
        ))
        .bind(&draft.name)
        .bind(&draft.display_name)
        .bind(draft.description.as_deref())
        .bind(draft.version.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(framework)
    }

    /// Domains of a framework in display order. Unknown framework is `NotFound`.
    pub async fn list_domains(&self, framework_id: i32) -> Result<Vec<Domain>, DbError> {
        self.get(framework_id).await?;
        let domains = sqlx::query_as(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM domains WHERE framework_id = $1 ORDER BY sort_order, id"
        ))
        .bind(framework_id)
        .fetch_all(self.pool)
        .await?;
        Ok(domains)
    }

    pub async fn get_domain(&self, id: i32) -> Result<Domain, DbError> {
        sqlx::query_as(&format!("SELECT {DOMAIN_COLUMNS} FROM domains WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("domain", id))
    }

    pub async fn upsert_domain(&self, draft: &DomainDraft) -> Result<Domain, DbError> {
        let domain = sqlx::query_as(&format!(
            r#"
            INSERT INTO domains (framework_id, name, display_name, description, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (framework_id, name) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                description = EXCLUDED.description,
                sort_order = EXCLUDED.sort_order
            RETURNING {DOMAIN_COLUMNS}
            "#
        ))
        .bind(draft.framework_id)
        .bind(&draft.name)
        .bind(&draft.display_name)
        .bind(draft.description.as_deref())
        .bind(draft.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::on_missing_parent(e, "framework", draft.framework_id))?;
        Ok(domain)
    }

    /// Controls of a domain ordered by code. Unknown domain is `NotFound`.
    pub async fn list_controls(&self, domain_id: i32) -> Result<(Domain, Vec<Control>), DbError> {
        let domain = self.get_domain(domain_id).await?;
        let controls = sqlx::query_as(&format!(
            "SELECT {CONTROL_COLUMNS} FROM controls WHERE domain_id = $1 ORDER BY control_code, id"
        ))
        .bind(domain_id)
        .fetch_all(self.pool)
        .await?;
        Ok((domain, controls))
    }

    pub async fn get_control(&self, id: i32) -> Result<Control, DbError> {
        sqlx::query_as(&format!("SELECT {CONTROL_COLUMNS} FROM controls WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("control", id))
    }

    pub async fn upsert_control(&self, draft: &ControlDraft) -> Result<Control, DbError> {
        let control = sqlx::query_as(&format!(
            r#"
            INSERT INTO controls (
                domain_id, control_code, name, description, guidance,
                maturity_level, reference_links, implementation_guide
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (domain_id, control_code) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                guidance = EXCLUDED.guidance,
                maturity_level = EXCLUDED.maturity_level,
                reference_links = EXCLUDED.reference_links,
                implementation_guide = EXCLUDED.implementation_guide
            RETURNING {CONTROL_COLUMNS}
            "#
        ))
        .bind(draft.domain_id)
        .bind(&draft.control_code)
        .bind(&draft.name)
        .bind(draft.description.as_deref())
        .bind(draft.guidance.as_deref())
        .bind(draft.maturity_level.as_deref())
        .bind(draft.reference_links.as_deref())
        .bind(draft.implementation_guide.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::on_missing_parent(e, "domain", draft.domain_id))?;
        Ok(control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn framework_upsert_is_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();
        let repo = FrameworkRepo::new(&pool);

        let draft = FrameworkDraft {
            name: "nca-ecc-test".into(),
            display_name: "NCA ECC".into(),
            description: None,
            version: Some("2018".into()),
        };
        let first = repo.upsert(&draft).await.unwrap();
        let second = repo.upsert(&draft).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn domains_of_unknown_framework() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let err = FrameworkRepo::new(&pool).list_domains(-1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "framework", .. }));
    }
}
