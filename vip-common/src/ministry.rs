//! Ministry tags
//!
//! The options offered on the ministry-identification step. `add` and
//! `rename` treat names that differ only in case as the same tag, accented
//! capitals included; `remove` takes the exact stored name.

use crate::db::{name_key, parse_id};
use crate::model::MinistryTag;
use crate::{Error, Result};
use chrono::Utc;
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqliteExecutor};
use tracing::info;
use uuid::Uuid;

/// How `remove` gets rid of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMode {
    /// Delete the row
    #[default]
    Hard,
    /// Keep the row but mark it inactive; `add` can bring it back
    Soft,
}

/// What `add` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    Reactivated,
    AlreadyActive,
}

fn tag_from_row(row: &SqliteRow) -> Result<MinistryTag> {
    let id: String = row.try_get("id")?;
    Ok(MinistryTag {
        id: parse_id(&id)?,
        name: row.try_get("name")?,
        active: row.try_get("active")?,
    })
}

fn clean_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("ministry name must not be empty".to_string()));
    }
    Ok(name)
}

/// Active ministry names, alphabetical
pub async fn list_active<'e, E>(executor: E) -> Result<Vec<String>>
where
    E: SqliteExecutor<'e>,
{
    let names = sqlx::query_scalar("SELECT name FROM ministries WHERE active = 1 ORDER BY name_key, name")
        .fetch_all(executor)
        .await?;
    Ok(names)
}

/// Every tag including inactive ones, alphabetical
pub async fn list_all<'e, E>(executor: E) -> Result<Vec<MinistryTag>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query("SELECT id, name, active FROM ministries ORDER BY name_key, name")
        .fetch_all(executor)
        .await?;
    rows.iter().map(tag_from_row).collect()
}

async fn find_by_key(conn: &mut SqliteConnection, name: &str) -> Result<Option<MinistryTag>> {
    let row = sqlx::query("SELECT id, name, active FROM ministries WHERE name_key = ?")
        .bind(name_key(name))
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(tag_from_row).transpose()
}

/// Add a tag, reactivating an inactive one with the same name
pub async fn add(conn: &mut SqliteConnection, name: &str) -> Result<AddOutcome> {
    let name = clean_name(name)?;

    match find_by_key(conn, name).await? {
        Some(tag) if tag.active => Ok(AddOutcome::AlreadyActive),
        Some(tag) => {
            sqlx::query("UPDATE ministries SET active = 1 WHERE id = ?")
                .bind(tag.id.to_string())
                .execute(&mut *conn)
                .await?;
            info!(ministry = %tag.name, "Ministry reactivated");
            Ok(AddOutcome::Reactivated)
        }
        None => {
            sqlx::query(
                "INSERT INTO ministries (id, name, name_key, active, created_at) VALUES (?, ?, ?, 1, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .bind(name_key(name))
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;
            info!(ministry = %name, "Ministry added");
            Ok(AddOutcome::Created)
        }
    }
}

/// Remove a tag by its exact stored name
///
/// Applications keep their recorded ministry label either way.
pub async fn remove<'e, E>(executor: E, name: &str, mode: RemovalMode) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let name = clean_name(name)?;
    let result = match mode {
        RemovalMode::Hard => {
            sqlx::query("DELETE FROM ministries WHERE name = ?")
                .bind(name)
                .execute(executor)
                .await?
        }
        RemovalMode::Soft => {
            sqlx::query("UPDATE ministries SET active = 0 WHERE name = ?")
                .bind(name)
                .execute(executor)
                .await?
        }
    };

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("ministry {}", name)));
    }

    info!(ministry = %name, ?mode, "Ministry removed");
    Ok(())
}

/// Rename a tag; the new name must not belong to another tag
pub async fn rename(conn: &mut SqliteConnection, old_name: &str, new_name: &str) -> Result<()> {
    let old_name = clean_name(old_name)?;
    let new_name = clean_name(new_name)?;

    let tag = find_by_key(conn, old_name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("ministry {}", old_name)))?;

    if let Some(other) = find_by_key(conn, new_name).await? {
        if other.id != tag.id {
            return Err(Error::InvalidInput(format!(
                "ministry {} already exists",
                other.name
            )));
        }
    }

    sqlx::query("UPDATE ministries SET name = ?, name_key = ? WHERE id = ?")
        .bind(new_name)
        .bind(name_key(new_name))
        .bind(tag.id.to_string())
        .execute(&mut *conn)
        .await?;

    info!(from = %old_name, to = %new_name, "Ministry renamed");
    Ok(())
}
