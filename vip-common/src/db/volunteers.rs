//! Volunteer application persistence

use crate::db::parse_id;
use crate::model::{
    AddictionStatus, ApplicationRecord, Classification, IntakeAnswers, MaritalStatus,
    PipelineStatus,
};
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor};
use uuid::Uuid;

/// Name shown for an application whose member row is gone
pub const UNKNOWN_NAME: &str = "Unknown";

const APPLICATION_SELECT: &str = r#"
    SELECT v.id, v.member_id, v.ministry, v.available_for_training, v.accepts_principles,
           v.formation_school, v.baptized, v.dating, v.partner_religion, v.addiction,
           v.addiction_details, v.status, v.observation, v.created_at,
           m.name AS member_name, m.phone AS member_phone,
           m.birth_date AS member_birth_date, m.marital_status AS member_marital_status
    FROM volunteers v
    LEFT JOIN members m ON m.id = v.member_id
"#;

fn application_from_row(row: &SqliteRow) -> Result<ApplicationRecord> {
    let id: String = row.try_get("id")?;
    let member_id: Option<String> = row.try_get("member_id")?;
    let status: String = row.try_get("status")?;
    let addiction: String = row.try_get("addiction")?;
    let member_name: Option<String> = row.try_get("member_name")?;
    let member_phone: Option<String> = row.try_get("member_phone")?;
    let member_birth_date: Option<NaiveDate> = row.try_get("member_birth_date")?;
    let member_marital: Option<String> = row.try_get("member_marital_status")?;
    let registered_at: DateTime<Utc> = row.try_get("created_at")?;

    let answers = IntakeAnswers {
        full_name: member_name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        phone: member_phone.unwrap_or_default(),
        birth_date: member_birth_date,
        marital_status: member_marital
            .as_deref()
            .map(MaritalStatus::from_label)
            .unwrap_or_default(),
        dating: row.try_get("dating")?,
        partner_religion: row.try_get("partner_religion")?,
        baptized: row.try_get("baptized")?,
        accepts_principles: row.try_get("accepts_principles")?,
        formation_school: row.try_get("formation_school")?,
        addiction: AddictionStatus::from_label(&addiction),
        addiction_details: row.try_get("addiction_details")?,
        available_for_training: row.try_get("available_for_training")?,
        ministry: row.try_get("ministry")?,
    };

    Ok(ApplicationRecord {
        id: parse_id(&id)?,
        member_id: member_id.as_deref().map(parse_id).transpose()?,
        answers,
        status: PipelineStatus::from_label(&status),
        observation: row.try_get("observation")?,
        registered_at,
    })
}

/// Insert a classified application linked to `member_id`
pub async fn insert_application<'e, E>(
    executor: E,
    id: Uuid,
    member_id: Uuid,
    answers: &IntakeAnswers,
    classification: &Classification,
    registered_at: DateTime<Utc>,
) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO volunteers (
            id, member_id, ministry, available_for_training, accepts_principles,
            formation_school, baptized, dating, partner_religion, addiction,
            addiction_details, status, observation, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(member_id.to_string())
    .bind(answers.ministry.trim())
    .bind(answers.available_for_training)
    .bind(answers.accepts_principles)
    .bind(answers.formation_school)
    .bind(answers.baptized)
    .bind(answers.dating)
    .bind(&answers.partner_religion)
    .bind(answers.addiction.as_str())
    .bind(&answers.addiction_details)
    .bind(classification.status.label())
    .bind(&classification.note)
    .bind(registered_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// All applications, newest first
pub async fn list_applications<'e, E>(executor: E) -> Result<Vec<ApplicationRecord>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{} ORDER BY v.created_at DESC, v.id", APPLICATION_SELECT);
    let rows = sqlx::query(&sql).fetch_all(executor).await?;

    rows.iter().map(application_from_row).collect()
}

/// Load one application
pub async fn get_application<'e, E>(executor: E, id: Uuid) -> Result<Option<ApplicationRecord>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{} WHERE v.id = ?", APPLICATION_SELECT);
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(application_from_row).transpose()
}

/// Write status and observation together; returns rows affected
pub async fn update_status<'e, E>(
    executor: E,
    id: Uuid,
    status: &PipelineStatus,
    observation: &str,
) -> Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE volunteers SET status = ?, observation = ? WHERE id = ?")
        .bind(status.label())
        .bind(observation)
        .bind(id.to_string())
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Hard-delete an application; returns rows affected
pub async fn delete_application<'e, E>(executor: E, id: Uuid) -> Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM volunteers WHERE id = ?")
        .bind(id.to_string())
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
