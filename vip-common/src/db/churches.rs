//! Church (organizational unit) lookups
//!
//! Churches are reference data: registration only reads them to attach a new
//! member. `add_church` exists for provisioning and tests.

use crate::db::parse_id;
use crate::Result;
use chrono::Utc;
use sqlx::SqliteExecutor;
use uuid::Uuid;

/// Insert a church and return its id
pub async fn add_church<'e, E>(executor: E, name: &str) -> Result<Uuid>
where
    E: SqliteExecutor<'e>,
{
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO churches (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id.to_string())
        .bind(name)
        .bind(Utc::now())
        .execute(executor)
        .await?;

    Ok(id)
}

/// Any church to attach a new member to (oldest first), if one exists
pub async fn first_church_id<'e, E>(executor: E) -> Result<Option<Uuid>>
where
    E: SqliteExecutor<'e>,
{
    let row: Option<String> =
        sqlx::query_scalar("SELECT id FROM churches ORDER BY created_at, id LIMIT 1")
            .fetch_optional(executor)
            .await?;

    row.as_deref().map(parse_id).transpose()
}
