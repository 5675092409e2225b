//! Database initialization
//!
//! Opens (or creates) the SQLite database and brings the schema up to date.
//! Schema creation is idempotent and safe to run on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers while a writer is active
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Let concurrent writers wait for the write lock instead of failing
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_profiles_table(&pool).await?;

    Ok(pool)
}

/// Create the profiles table
///
/// One record per person, keyed by the human-chosen unique name. The
/// PRIMARY KEY on `name` is what enforces uniqueness; concurrent creates
/// for the same name cannot both succeed as inserts. Timestamps are stored
/// as RFC 3339 text.
pub async fn create_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            name TEXT PRIMARY KEY,
            age TEXT NOT NULL,
            gender TEXT NOT NULL,
            blood_group TEXT NOT NULL,
            date_of_birth TEXT NOT NULL,
            medical_conditions TEXT,
            health_insurance TEXT,
            photo_path TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (length(name) > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_creates_database_and_schema() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("medidir.db");

        let pool = init_database(&db_path).await.unwrap();

        assert!(db_path.exists());
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn init_is_idempotent_on_existing_database() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("medidir.db");

        let pool = init_database(&db_path).await.unwrap();
        sqlx::query(
            "INSERT INTO profiles (name, age, gender, blood_group, date_of_birth, created_at, updated_at)
             VALUES ('Alice', '30', 'F', 'O+', '1994-01-01', '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;

        // Reopening must keep existing data intact
        let pool = init_database(&db_path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_by_schema() {
        let temp = tempfile::tempdir().unwrap();
        let pool = init_database(&temp.path().join("medidir.db")).await.unwrap();

        let result = sqlx::query(
            "INSERT INTO profiles (name, age, gender, blood_group, date_of_birth, created_at, updated_at)
             VALUES ('', '30', 'F', 'O+', '1994-01-01', '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }
}
