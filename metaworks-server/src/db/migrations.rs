//! Schema migrations
//!
//! Every statement is idempotent so `run` is safe at each startup.

use sqlx::PgPool;

/// Ordered (name, statement) pairs. Referenced tables come first.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            access_level TEXT NOT NULL DEFAULT 'trial',
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "sessions",
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            expires_at TIMESTAMPTZ NOT NULL
        )
        "#,
    ),
    (
        "files",
        r#"
        CREATE TABLE IF NOT EXISTS files (
            id SERIAL PRIMARY KEY,
            original_name TEXT NOT NULL,
            stored_name TEXT NOT NULL UNIQUE,
            content_type TEXT,
            size_bytes BIGINT NOT NULL,
            uploaded_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "company_info",
        r#"
        CREATE TABLE IF NOT EXISTS company_info (
            id SERIAL PRIMARY KEY,
            company_name TEXT NOT NULL,
            ceo_name TEXT,
            cio_name TEXT,
            cto_name TEXT,
            ciso_name TEXT,
            logo_id INTEGER REFERENCES files(id) ON DELETE SET NULL
        )
        "#,
    ),
    (
        "cybersecurity_staff",
        r#"
        CREATE TABLE IF NOT EXISTS cybersecurity_staff (
            id SERIAL PRIMARY KEY,
            company_id INTEGER NOT NULL REFERENCES company_info(id) ON DELETE CASCADE,
            staff_name TEXT NOT NULL
        )
        "#,
    ),
    (
        "policies",
        r#"
        CREATE TABLE IF NOT EXISTS policies (
            id SERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            policy_type TEXT NOT NULL,
            content TEXT,
            file_id INTEGER REFERENCES files(id) ON DELETE SET NULL,
            version TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "risks",
        r#"
        CREATE TABLE IF NOT EXISTS risks (
            id SERIAL PRIMARY KEY,
            company_id INTEGER REFERENCES company_info(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            cause TEXT,
            category TEXT NOT NULL,
            owner TEXT,
            likelihood TEXT NOT NULL,
            impact TEXT NOT NULL,
            inherent_risk_level TEXT NOT NULL,
            existing_controls TEXT,
            control_effectiveness TEXT,
            residual_risk_level TEXT,
            mitigation_actions TEXT,
            target_date TEXT,
            is_accepted BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "frameworks",
        r#"
        CREATE TABLE IF NOT EXISTS frameworks (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            description TEXT,
            version TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "domains",
        r#"
        CREATE TABLE IF NOT EXISTS domains (
            id SERIAL PRIMARY KEY,
            framework_id INTEGER NOT NULL REFERENCES frameworks(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            display_name TEXT NOT NULL,
            description TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            UNIQUE (framework_id, name)
        )
        "#,
    ),
    (
        "controls",
        r#"
        CREATE TABLE IF NOT EXISTS controls (
            id SERIAL PRIMARY KEY,
            domain_id INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
            control_code TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            guidance TEXT,
            maturity_level TEXT,
            reference_links TEXT,
            implementation_guide TEXT,
            UNIQUE (domain_id, control_code)
        )
        "#,
    ),
    (
        "assessments",
        r#"
        CREATE TABLE IF NOT EXISTS assessments (
            id SERIAL PRIMARY KEY,
            company_id INTEGER REFERENCES company_info(id) ON DELETE CASCADE,
            framework_id INTEGER NOT NULL REFERENCES frameworks(id),
            name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            score INTEGER CHECK (score BETWEEN 0 AND 100),
            start_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            completion_date TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "assessment_results",
        r#"
        CREATE TABLE IF NOT EXISTS assessment_results (
            id SERIAL PRIMARY KEY,
            assessment_id INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE,
            control_id INTEGER NOT NULL REFERENCES controls(id) ON DELETE CASCADE,
            status TEXT NOT NULL,
            priority TEXT NOT NULL DEFAULT 'medium',
            evidence TEXT,
            comments TEXT,
            recommendation TEXT,
            management_response TEXT,
            target_date TEXT,
            updated_by TEXT,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (assessment_id, control_id)
        )
        "#,
    ),
    (
        "remediation_tasks",
        r#"
        CREATE TABLE IF NOT EXISTS remediation_tasks (
            id SERIAL PRIMARY KEY,
            assessment_id INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE,
            control_id INTEGER NOT NULL REFERENCES controls(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'open',
            priority TEXT NOT NULL DEFAULT 'medium',
            assigned_to TEXT,
            due_date TEXT,
            external_id TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (assessment_id, control_id, title)
        )
        "#,
    ),
    (
        "indexes",
        r#"
        CREATE INDEX IF NOT EXISTS idx_risks_company ON risks(company_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions(expires_at);
        CREATE INDEX IF NOT EXISTS idx_assessments_company ON assessments(company_id);
        "#,
    ),
];

/// Run all migrations in order.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    for (name, statement) in MIGRATIONS {
        tracing::debug!(migration = name, "applying");
        sqlx::raw_sql(statement).execute(pool).await?;
    }

    tracing::info!(count = MIGRATIONS.len(), "Migrations complete");
    Ok(())
}
