//! Training attendance
//!
//! One row per (volunteer, class) in `training_progress`. Setting attendance
//! is an upsert, so repeating a toggle never creates duplicates.

use crate::db::{parse_id, volunteers};
use crate::model::TrainingRecord;
use crate::{Error, Result};
use chrono::Utc;
use sqlx::{Row, SqliteExecutor, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Number of training classes tracked per volunteer
pub const TRACKED_CLASSES: u32 = 3;

/// Record whether `volunteer_id` completed class `class_number` (1-based)
///
/// `NotFound` when no application has that id.
pub async fn set_attendance<'e, E>(
    executor: E,
    volunteer_id: Uuid,
    class_number: u32,
    completed: bool,
) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    if class_number == 0 || class_number > TRACKED_CLASSES {
        return Err(Error::InvalidInput(format!(
            "class number must be between 1 and {}, got {}",
            TRACKED_CLASSES, class_number
        )));
    }

    let now = Utc::now();
    let completed_at = completed.then_some(now);

    // Selecting from volunteers writes nothing for an unknown id
    let result = sqlx::query(
        r#"
        INSERT INTO training_progress (volunteer_id, class_number, completed, completed_at, updated_at)
        SELECT id, ?, ?, ?, ? FROM volunteers WHERE id = ?
        ON CONFLICT(volunteer_id, class_number) DO UPDATE SET
            completed = excluded.completed,
            completed_at = excluded.completed_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(class_number as i64)
    .bind(completed)
    .bind(completed_at)
    .bind(now)
    .bind(volunteer_id.to_string())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("volunteer {}", volunteer_id)));
    }

    debug!(volunteer_id = %volunteer_id, class_number, completed, "Attendance recorded");
    Ok(())
}

/// Training roster: volunteers in a training-relevant status, newest first
pub async fn get_progress(pool: &SqlitePool) -> Result<Vec<TrainingRecord>> {
    let applications = volunteers::list_applications(pool).await?;

    let rows = sqlx::query(
        "SELECT volunteer_id, class_number, completed FROM training_progress",
    )
    .fetch_all(pool)
    .await?;

    let mut attendance: HashMap<Uuid, Vec<bool>> = HashMap::new();
    for row in rows {
        let volunteer_id: String = row.try_get("volunteer_id")?;
        let class_number: i64 = row.try_get("class_number")?;
        let completed: bool = row.try_get("completed")?;

        if class_number < 1 || class_number > TRACKED_CLASSES as i64 {
            continue;
        }
        let classes = attendance
            .entry(parse_id(&volunteer_id)?)
            .or_insert_with(|| vec![false; TRACKED_CLASSES as usize]);
        classes[(class_number - 1) as usize] = completed;
    }

    Ok(applications
        .into_iter()
        .filter(|app| app.status.in_training_roster())
        .map(|app| TrainingRecord {
            classes: attendance
                .remove(&app.id)
                .unwrap_or_else(|| vec![false; TRACKED_CLASSES as usize]),
            volunteer_id: app.id,
            full_name: app.answers.full_name,
            status: app.status,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    async fn completed_rows(pool: &SqlitePool) -> Vec<(i64, bool, Option<String>)> {
        sqlx::query_as("SELECT class_number, completed, completed_at FROM training_progress")
            .fetch_all(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_class_number_out_of_range() {
        let pool = connect_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        assert!(matches!(
            set_attendance(&pool, id, 0, true).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            set_attendance(&pool, id, TRACKED_CLASSES + 1, true).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(completed_rows(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_volunteer_is_not_found() {
        let pool = connect_in_memory().await.unwrap();
        let err = set_attendance(&pool, Uuid::new_v4(), 1, true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(completed_rows(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_roster() {
        let pool = connect_in_memory().await.unwrap();
        assert!(get_progress(&pool).await.unwrap().is_empty());
    }
}
