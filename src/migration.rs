//! Versioned schema migrations, recorded in `_sys_migrations`.
//! Applied in version order; each runs once, inside its own transaction.

use crate::store::StoreError;
use sqlx::{PgPool, Postgres, Transaction};

pub const MIGRATIONS_TABLE: &str = "_sys_migrations";

/// Advisory lock key held by every migration transaction, so concurrent
/// runners against one database take turns.
pub const MIGRATION_LOCK_KEY: i64 = 0x726f_7374_6572;

pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static [&'static str],
    pub down: &'static [&'static str],
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 2025_08_01_000001,
        name: "create_students_table",
        up: &[r#"
            CREATE TABLE students (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                gender VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT students_email_unique UNIQUE (email)
            )
        "#],
        down: &["DROP TABLE IF EXISTS students"],
    },
    Migration {
        version: 2025_08_01_000002,
        name: "create_users_and_categories_tables",
        up: &[
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                slug VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW()
            )
            "#,
        ],
        down: &["DROP TABLE IF EXISTS categories", "DROP TABLE IF EXISTS users"],
    },
    Migration {
        version: 2025_08_08_094842,
        name: "create_posts_table",
        up: &[r#"
            CREATE TABLE posts (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                category_id BIGINT NOT NULL REFERENCES categories (id) ON DELETE CASCADE,
                title VARCHAR(255) NOT NULL,
                slug VARCHAR(255) NOT NULL,
                thumbnail VARCHAR(255),
                excerpt TEXT,
                content TEXT NOT NULL,
                status VARCHAR(255) NOT NULL DEFAULT 'draft'
                    CHECK (status IN ('draft', 'published', 'archived')),
                published_at TIMESTAMP NOT NULL,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW()
            )
        "#],
        down: &["DROP TABLE IF EXISTS posts"],
    },
    Migration {
        version: 2025_08_08_100000,
        name: "create_comments_and_seos_tables",
        up: &[
            r#"
            CREATE TABLE comments (
                id BIGSERIAL PRIMARY KEY,
                parent_id BIGINT REFERENCES comments (id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                post_id BIGINT NOT NULL REFERENCES posts (id) ON DELETE CASCADE,
                status VARCHAR(255) NOT NULL DEFAULT 'pending',
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE seos (
                id BIGSERIAL PRIMARY KEY,
                post_id BIGINT NOT NULL REFERENCES posts (id) ON DELETE CASCADE,
                meta_title VARCHAR(255),
                meta_description TEXT,
                meta_keywords TEXT,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW()
            )
            "#,
        ],
        down: &["DROP TABLE IF EXISTS seos", "DROP TABLE IF EXISTS comments"],
    },
];

pub async fn ensure_migrations_table(pool: &PgPool) -> Result<(), StoreError> {
    let mut tx = locked(pool).await?;
    create_migrations_table(&mut tx).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>, StoreError> {
    let rows: Vec<(i64,)> = sqlx::query_as(&format!(
        "SELECT version FROM {} ORDER BY version",
        MIGRATIONS_TABLE
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Apply every pending migration. Returns the versions applied by this call.
pub async fn apply_migrations(pool: &PgPool) -> Result<Vec<i64>, StoreError> {
    ensure_migrations_table(pool).await?;
    let mut applied = Vec::new();
    for m in MIGRATIONS {
        let mut tx = locked(pool).await?;
        if is_applied(&mut tx, m.version).await? {
            tx.rollback().await?;
            continue;
        }
        for stmt in m.up {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        sqlx::query(&format!(
            "INSERT INTO {} (version, name) VALUES ($1, $2)",
            MIGRATIONS_TABLE
        ))
        .bind(m.version)
        .bind(m.name)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!(version = m.version, name = m.name, "migration applied");
        applied.push(m.version);
    }
    Ok(applied)
}

/// Revert the newest applied migration, if any.
pub async fn rollback_last(pool: &PgPool) -> Result<Option<i64>, StoreError> {
    let mut tx = locked(pool).await?;
    create_migrations_table(&mut tx).await?;
    let last: Option<(i64,)> = sqlx::query_as(&format!(
        "SELECT version FROM {} ORDER BY version DESC LIMIT 1",
        MIGRATIONS_TABLE
    ))
    .fetch_optional(&mut *tx)
    .await?;
    let Some((last,)) = last else {
        tx.rollback().await?;
        return Ok(None);
    };
    let m = MIGRATIONS
        .iter()
        .find(|m| m.version == last)
        .ok_or_else(|| StoreError::Unavailable(format!("unknown applied migration {}", last)))?;
    for stmt in m.down {
        sqlx::query(stmt).execute(&mut *tx).await?;
    }
    sqlx::query(&format!("DELETE FROM {} WHERE version = $1", MIGRATIONS_TABLE))
        .bind(m.version)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    tracing::info!(version = m.version, name = m.name, "migration rolled back");
    Ok(Some(m.version))
}

/// Open a transaction holding [`MIGRATION_LOCK_KEY`] until commit or rollback.
async fn locked(pool: &PgPool) -> Result<Transaction<'static, Postgres>, StoreError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

async fn create_migrations_table(tx: &mut Transaction<'static, Postgres>) -> Result<(), StoreError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            version BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        MIGRATIONS_TABLE
    ))
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn is_applied(tx: &mut Transaction<'static, Postgres>, version: i64) -> Result<bool, StoreError> {
    let row: Option<(i64,)> = sqlx::query_as(&format!(
        "SELECT version FROM {} WHERE version = $1",
        MIGRATIONS_TABLE
    ))
    .bind(version)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row.is_some())
}
