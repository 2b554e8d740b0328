//! Member (person record) persistence

use crate::db::{name_key, parse_id};
use crate::model::{IntakeAnswers, MaritalStatus, Member};
use crate::Result;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor};
use uuid::Uuid;

const MEMBER_COLUMNS: &str = "id, church_id, name, phone, birth_date, marital_status";

/// Stored phone with the usual formatting characters removed
///
/// Lets a digits-only search match numbers saved as "+55 (11) 99999-9999".
const NORMALIZED_PHONE_SQL: &str = "replace(replace(replace(replace(replace(replace(\
     phone, ' ', ''), '-', ''), '(', ''), ')', ''), '+', ''), '.', '')";

fn member_from_row(row: &SqliteRow) -> Result<Member> {
    let id: String = row.try_get("id")?;
    let church_id: String = row.try_get("church_id")?;
    let marital: String = row.try_get("marital_status")?;
    let birth_date: Option<NaiveDate> = row.try_get("birth_date")?;

    Ok(Member {
        id: parse_id(&id)?,
        church_id: parse_id(&church_id)?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        birth_date,
        marital_status: MaritalStatus::from_label(&marital),
    })
}

/// First member (oldest) whose normalized phone contains `digits`
pub async fn find_by_phone_fragment<'e, E>(executor: E, digits: &str) -> Result<Option<Member>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM members WHERE instr({}, ?) > 0 ORDER BY created_at, id LIMIT 1",
        MEMBER_COLUMNS, NORMALIZED_PHONE_SQL
    );

    let row = sqlx::query(&sql)
        .bind(digits)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(member_from_row).transpose()
}

/// First member (oldest) whose name equals `name`, ignoring case
pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Member>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM members WHERE name_key = ? ORDER BY created_at, id LIMIT 1",
        MEMBER_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(name_key(name))
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(member_from_row).transpose()
}

/// Create a visitor member from the submitted answers
pub async fn insert_member<'e, E>(
    executor: E,
    church_id: Uuid,
    answers: &IntakeAnswers,
) -> Result<Member>
where
    E: SqliteExecutor<'e>,
{
    let member = Member {
        id: Uuid::new_v4(),
        church_id,
        name: answers.full_name.trim().to_string(),
        phone: Some(answers.phone.clone()).filter(|p| !p.is_empty()),
        birth_date: answers.birth_date,
        marital_status: answers.marital_status,
    };
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO members (
            id, church_id, name, name_key, phone, birth_date, marital_status,
            member_type, status, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, 'VISITOR', 'ACTIVE', ?, ?)
        "#,
    )
    .bind(member.id.to_string())
    .bind(member.church_id.to_string())
    .bind(&member.name)
    .bind(name_key(&member.name))
    .bind(&member.phone)
    .bind(member.birth_date)
    .bind(member.marital_status.as_str())
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(member)
}

/// Overwrite marital status, birth date and phone from a new submission
pub async fn refresh_member<'e, E>(executor: E, member_id: Uuid, answers: &IntakeAnswers) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE members
        SET marital_status = ?, birth_date = ?, phone = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(answers.marital_status.as_str())
    .bind(answers.birth_date)
    .bind(Some(answers.phone.clone()).filter(|p| !p.is_empty()))
    .bind(Utc::now())
    .bind(member_id.to_string())
    .execute(executor)
    .await?;

    Ok(())
}

/// Load a member by id
pub async fn get_member<'e, E>(executor: E, member_id: Uuid) -> Result<Option<Member>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(member_id.to_string())
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(member_from_row).transpose()
}
