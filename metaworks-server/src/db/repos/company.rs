//! Company profile - a single row plus its cybersecurity staff list

use serde::Serialize;
use sqlx::{FromRow, PgPool, Row};

use super::DbError;
use crate::models::CompanyUpdate;

#[derive(Debug, Clone, FromRow)]
struct CompanyRow {
    id: i32,
    company_name: String,
    ceo_name: Option<String>,
    cio_name: Option<String>,
    cto_name: Option<String>,
    ciso_name: Option<String>,
    logo_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub id: i32,
    pub company_name: String,
    pub ceo_name: Option<String>,
    pub cio_name: Option<String>,
    pub cto_name: Option<String>,
    pub ciso_name: Option<String>,
    pub logo_id: Option<i32>,
    pub cybersecurity_staff: Vec<String>,
}

impl CompanyInfo {
    fn from_row(row: CompanyRow, staff: Vec<String>) -> Self {
        Self {
            id: row.id,
            company_name: row.company_name,
            ceo_name: row.ceo_name,
            cio_name: row.cio_name,
            cto_name: row.cto_name,
            ciso_name: row.ciso_name,
            logo_id: row.logo_id,
            cybersecurity_staff: staff,
        }
    }
}

/// Advisory lock key for the single company profile row.
const COMPANY_PROFILE_LOCK: i64 = 0x4d57_434f;

const COMPANY_COLUMNS: &str = "id, company_name, ceo_name, cio_name, cto_name, ciso_name, logo_id";

pub struct CompanyRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanyRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The stored profile, if one was ever saved.
    pub async fn get(&self) -> Result<Option<CompanyInfo>, DbError> {
        let row: Option<CompanyRow> = sqlx::query_as(&format!(
            "SELECT {COMPANY_COLUMNS} FROM company_info ORDER BY id LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let staff = sqlx::query(
            "SELECT staff_name FROM cybersecurity_staff WHERE company_id = $1 ORDER BY id",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|r| r.get::<String, _>("staff_name"))
        .collect();

        Ok(Some(CompanyInfo::from_row(row, staff)))
    }

    /// Create or update the profile. Officer fields left `None` keep their
    /// stored value; a `Some` staff list replaces the stored one.
    pub async fn save(&self, update: &CompanyUpdate) -> Result<CompanyInfo, DbError> {
        let mut tx = self.pool.begin().await?;

        // Serializes first saves, when there is no row for FOR UPDATE to lock.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(COMPANY_PROFILE_LOCK)
            .execute(&mut *tx)
            .await?;

        let existing: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM company_info ORDER BY id LIMIT 1 FOR UPDATE")
                .fetch_optional(&mut *tx)
                .await?;

        let row: CompanyRow = match existing {
            Some((id,)) => {
                sqlx::query_as(&format!(
                    r#"
                    UPDATE company_info SET
                        company_name = $2,
                        ceo_name = COALESCE($3, ceo_name),
                        cio_name = COALESCE($4, cio_name),
                        cto_name = COALESCE($5, cto_name),
                        ciso_name = COALESCE($6, ciso_name),
                        logo_id = COALESCE($7, logo_id)
                    WHERE id = $1
                    RETURNING {COMPANY_COLUMNS}
                    "#
                ))
                .bind(id)
                .bind(&update.company_name)
                .bind(update.ceo_name.as_deref())
                .bind(update.cio_name.as_deref())
                .bind(update.cto_name.as_deref())
                .bind(update.ciso_name.as_deref())
                .bind(update.logo_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| DbError::on_missing_parent(e, "file", update.logo_id.unwrap_or_default()))?
            }
            None => {
                sqlx::query_as(&format!(
                    r#"
                    INSERT INTO company_info (company_name, ceo_name, cio_name, cto_name, ciso_name, logo_id)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING {COMPANY_COLUMNS}
                    "#
                ))
                .bind(&update.company_name)
                .bind(update.ceo_name.as_deref())
                .bind(update.cio_name.as_deref())
                .bind(update.cto_name.as_deref())
                .bind(update.ciso_name.as_deref())
                .bind(update.logo_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| DbError::on_missing_parent(e, "file", update.logo_id.unwrap_or_default()))?
            }
        };

        if let Some(staff) = &update.staff {
            sqlx::query("DELETE FROM cybersecurity_staff WHERE company_id = $1")
                .bind(row.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                r#"
                INSERT INTO cybersecurity_staff (company_id, staff_name)
                SELECT $1, name FROM UNNEST($2::text[]) WITH ORDINALITY AS t(name, ord)
                ORDER BY ord
                "#,
            )
            .bind(row.id)
            .bind(staff.as_slice())
            .execute(&mut *tx)
            .await?;
        }

        let staff = sqlx::query(
            "SELECT staff_name FROM cybersecurity_staff WHERE company_id = $1 ORDER BY id",
        )
        .bind(row.id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|r| r.get::<String, _>("staff_name"))
        .collect();

        tx.commit().await?;
        Ok(CompanyInfo::from_row(row, staff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn save_keeps_staff_when_not_given() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();
        let repo = CompanyRepo::new(&pool);

        let mut update = CompanyUpdate {
            company_name: "Acme".into(),
            ceo_name: Some("Layla".into()),
            cio_name: None,
            cto_name: None,
            ciso_name: None,
            logo_id: None,
            staff: Some(vec!["Ana".into(), "Omar".into()]),
        };
        let saved = repo.save(&update).await.unwrap();
        assert_eq!(saved.cybersecurity_staff, vec!["Ana", "Omar"]);

        update.staff = None;
        update.ceo_name = None;
        let saved = repo.save(&update).await.unwrap();
        assert_eq!(saved.cybersecurity_staff, vec!["Ana", "Omar"]);
        assert_eq!(saved.ceo_name.as_deref(), Some("Layla"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unknown_logo_is_not_found() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let update = CompanyUpdate {
            company_name: "Acme".into(),
            ceo_name: None,
            cio_name: None,
            cto_name: None,
            ciso_name: None,
            logo_id: Some(999_999),
            staff: None,
        };
        let err = CompanyRepo::new(&pool).save(&update).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "file", .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_first_saves_keep_one_profile() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let update = CompanyUpdate {
            company_name: "Acme".into(),
            ceo_name: None,
            cio_name: None,
            cto_name: None,
            ciso_name: None,
            logo_id: None,
            staff: None,
        };
        let repo = CompanyRepo::new(&pool);
        let (a, b) = tokio::join!(repo.save(&update), repo.save(&update));
        assert_eq!(a.unwrap().id, b.unwrap().id);
    }
}
