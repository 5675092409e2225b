//! Profile document store
//!
//! One document per unique name. All writes go through the single-statement
//! upsert, so concurrent submissions for the same name serialize inside
//! SQLite and the later writer wins; the uniqueness of `name` is enforced by
//! the schema, not by application checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::validate::ProfileSubmission;

/// Canonical profile record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub blood_group: String,
    pub date_of_birth: String,
    /// Absent means "not provided", never an empty string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    /// Absent means "not provided", never an empty string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_insurance: Option<String>,
    /// Public `/uploads/...` path of the owned photo asset, if any
    pub photo_path: Option<String>,
    /// Set once at first creation, immutable thereafter
    pub created_at: DateTime<Utc>,
    /// Set on every successful write
    pub updated_at: DateTime<Utc>,
}

/// Create or update the record for `submission.name`.
///
/// A single `INSERT ... ON CONFLICT` statement: atomic with respect to the
/// name uniqueness invariant, last-writer-wins on `updated_at`. Optional
/// fields and the photo path use COALESCE so a submission that omits them
/// leaves the stored values untouched; `created_at` is only set on insert.
pub async fn upsert_by_name(
    pool: &SqlitePool,
    submission: &ProfileSubmission,
    photo_path: Option<&str>,
) -> Result<ProfileRecord, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let row = sqlx::query(
        r#"
        INSERT INTO profiles (name, age, gender, blood_group, date_of_birth,
                              medical_conditions, health_insurance, photo_path,
                              created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            age = excluded.age,
            gender = excluded.gender,
            blood_group = excluded.blood_group,
            date_of_birth = excluded.date_of_birth,
            medical_conditions = COALESCE(excluded.medical_conditions, medical_conditions),
            health_insurance = COALESCE(excluded.health_insurance, health_insurance),
            photo_path = COALESCE(excluded.photo_path, photo_path),
            updated_at = excluded.updated_at
        RETURNING name, age, gender, blood_group, date_of_birth,
                  medical_conditions, health_insurance, photo_path,
                  created_at, updated_at
        "#,
    )
    .bind(&submission.name)
    .bind(&submission.age)
    .bind(&submission.gender)
    .bind(&submission.blood_group)
    .bind(&submission.date_of_birth)
    .bind(submission.medical_conditions.as_deref())
    .bind(submission.health_insurance.as_deref())
    .bind(photo_path)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    record_from_row(&row)
}

/// Load a profile by exact name match
pub async fn find_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<ProfileRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT name, age, gender, blood_group, date_of_birth,
               medical_conditions, health_insurance, photo_path,
               created_at, updated_at
        FROM profiles
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Load every profile, ordered by name
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<ProfileRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT name, age, gender, blood_group, date_of_birth,
               medical_conditions, health_insurance, photo_path,
               created_at, updated_at
        FROM profiles
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Delete a profile by name, returning its prior contents.
///
/// The prior record (including `photo_path`) comes back from the same
/// statement so the caller can drive asset cleanup. `None` means no such
/// record existed.
pub async fn delete_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<ProfileRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        DELETE FROM profiles
        WHERE name = ?
        RETURNING name, age, gender, blood_group, date_of_birth,
                  medical_conditions, health_insurance, photo_path,
                  created_at, updated_at
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

fn record_from_row(row: &SqliteRow) -> Result<ProfileRecord, sqlx::Error> {
    Ok(ProfileRecord {
        name: row.get("name"),
        age: row.get("age"),
        gender: row.get("gender"),
        blood_group: row.get("blood_group"),
        date_of_birth: row.get("date_of_birth"),
        medical_conditions: row.get("medical_conditions"),
        health_insurance: row.get("health_insurance"),
        photo_path: row.get("photo_path"),
        created_at: parse_timestamp(row, "created_at")?,
        updated_at: parse_timestamp(row, "updated_at")?,
    })
}

fn parse_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let raw: String = row.get(column);
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}
