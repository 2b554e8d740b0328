//! Admin review operations

use crate::db::volunteers;
use crate::model::{ApplicationRecord, PipelineStatus};
use crate::{Error, Result};
use sqlx::SqliteExecutor;
use tracing::{info, warn};
use uuid::Uuid;

pub const APPROVED_NOTE: &str = "Candidate approved by ministry coordination.";
pub const REJECTED_NOTE: &str = "Candidate rejected after administrative review.";

/// All applications with their member details, newest first
pub async fn list_applications<'e, E>(executor: E) -> Result<Vec<ApplicationRecord>>
where
    E: SqliteExecutor<'e>,
{
    volunteers::list_applications(executor).await
}

/// Mark an application Approved
pub async fn approve<'e, E>(executor: E, volunteer_id: Uuid) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    write_status(executor, volunteer_id, &PipelineStatus::Approved, APPROVED_NOTE).await
}

/// Mark an application Rejected
pub async fn reject<'e, E>(executor: E, volunteer_id: Uuid) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    write_status(executor, volunteer_id, &PipelineStatus::Rejected, REJECTED_NOTE).await
}

/// Set any status label with a free-text note
pub async fn set_status<'e, E>(
    executor: E,
    volunteer_id: Uuid,
    status: &str,
    note: &str,
) -> Result<PipelineStatus>
where
    E: SqliteExecutor<'e>,
{
    let label = status.trim();
    if label.is_empty() {
        return Err(Error::InvalidInput("status must not be empty".to_string()));
    }

    let status = PipelineStatus::from_label(label);
    write_status(executor, volunteer_id, &status, note.trim()).await?;
    Ok(status)
}

async fn write_status<'e, E>(
    executor: E,
    volunteer_id: Uuid,
    status: &PipelineStatus,
    note: &str,
) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let affected = volunteers::update_status(executor, volunteer_id, status, note).await?;
    if affected == 0 {
        return Err(Error::NotFound(format!("volunteer {}", volunteer_id)));
    }

    info!(volunteer_id = %volunteer_id, status = %status, "Application status changed");
    Ok(())
}

/// Permanently delete an application
///
/// Exactly one row must go. Zero rows means the record is missing or the
/// store refused the delete, reported as `DeleteDenied` rather than as a
/// database failure.
pub async fn delete_volunteer<'e, E>(executor: E, volunteer_id: Uuid) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let affected = volunteers::delete_application(executor, volunteer_id).await?;
    if affected == 0 {
        warn!(volunteer_id = %volunteer_id, "Delete affected no rows");
        return Err(Error::DeleteDenied(format!(
            "volunteer {} was not deleted",
            volunteer_id
        )));
    }

    info!(volunteer_id = %volunteer_id, "Application deleted");
    Ok(())
}
