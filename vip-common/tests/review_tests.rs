//! Integration tests for admin review, training and the review board

use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;
use vip_common::dashboard::ReviewBoard;
use vip_common::db::{churches, connect_in_memory};
use vip_common::model::PipelineStatus;
use vip_common::registration::process_registration;
use vip_common::review::{self, APPROVED_NOTE, REJECTED_NOTE};
use vip_common::training::{self, TRACKED_CLASSES};
use vip_common::{Error, IntakeAnswers};

async fn setup() -> SqlitePool {
    let pool = connect_in_memory().await.unwrap();
    churches::add_church(&pool, "Central").await.unwrap();
    pool
}

async fn register(pool: &SqlitePool, name: &str, phone: &str, baptized: bool) -> Uuid {
    let answers = IntakeAnswers {
        full_name: name.to_string(),
        phone: phone.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1988, 1, 20),
        baptized,
        accepts_principles: true,
        formation_school: true,
        available_for_training: true,
        ministry: "Media".to_string(),
        ..Default::default()
    };
    process_registration(pool, &answers)
        .await
        .unwrap()
        .application_id
}

#[tokio::test]
async fn test_attendance_toggle_leaves_single_row() {
    let pool = setup().await;
    let v1 = register(&pool, "Ana", "5511911112222", true).await;

    training::set_attendance(&pool, v1, 2, true).await.unwrap();
    training::set_attendance(&pool, v1, 2, false).await.unwrap();

    let rows: Vec<(bool, Option<String>)> = sqlx::query_as(
        "SELECT completed, completed_at FROM training_progress WHERE volunteer_id = ? AND class_number = 2",
    )
    .bind(v1.to_string())
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert!(!rows[0].0);
    assert!(rows[0].1.is_none());
}

#[tokio::test]
async fn test_progress_lists_roster_statuses_with_missing_classes_false() {
    let pool = setup().await;
    let eligible = register(&pool, "Ana", "5511911112222", true).await;
    let integration = register(&pool, "Bruno", "5511933334444", false).await;
    let rejected = register(&pool, "Carla", "5511955556666", true).await;
    review::reject(&pool, rejected).await.unwrap();

    training::set_attendance(&pool, eligible, 1, true).await.unwrap();
    training::set_attendance(&pool, eligible, 3, true).await.unwrap();

    let progress = training::get_progress(&pool).await.unwrap();
    let ids: Vec<Uuid> = progress.iter().map(|t| t.volunteer_id).collect();
    assert!(ids.contains(&eligible));
    assert!(ids.contains(&integration));
    assert!(!ids.contains(&rejected));

    let ana = progress.iter().find(|t| t.volunteer_id == eligible).unwrap();
    assert_eq!(ana.classes.len(), TRACKED_CLASSES as usize);
    assert_eq!(ana.classes, vec![true, false, true]);

    let bruno = progress.iter().find(|t| t.volunteer_id == integration).unwrap();
    assert_eq!(bruno.status, PipelineStatus::RoutedToIntegration);
    assert_eq!(bruno.classes, vec![false; TRACKED_CLASSES as usize]);
}

#[tokio::test]
async fn test_approve_and_reject_write_canned_notes() {
    let pool = setup().await;
    let id = register(&pool, "Ana", "5511911112222", true).await;

    review::approve(&pool, id).await.unwrap();
    // Re-applying the current status is accepted
    review::approve(&pool, id).await.unwrap();
    let apps = review::list_applications(&pool).await.unwrap();
    assert_eq!(apps[0].status, PipelineStatus::Approved);
    assert_eq!(apps[0].observation, APPROVED_NOTE);

    review::reject(&pool, id).await.unwrap();
    let apps = review::list_applications(&pool).await.unwrap();
    assert_eq!(apps[0].status, PipelineStatus::Rejected);
    assert_eq!(apps[0].observation, REJECTED_NOTE);
}

#[tokio::test]
async fn test_custom_status() {
    let pool = setup().await;
    let id = register(&pool, "Ana", "5511911112222", true).await;

    let status = review::set_status(&pool, id, "On hold until March", "Travelling")
        .await
        .unwrap();
    assert_eq!(status, PipelineStatus::Custom("On hold until March".to_string()));

    let err = review::set_status(&pool, id, "  ", "note").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = review::approve(&pool, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_delete_zero_rows_is_denial_not_transport_failure() {
    let pool = setup().await;
    let id = register(&pool, "Ana", "5511911112222", true).await;
    training::set_attendance(&pool, id, 1, true).await.unwrap();

    review::delete_volunteer(&pool, id).await.unwrap();
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM training_progress")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let err = review::delete_volunteer(&pool, id).await.unwrap_err();
    assert!(matches!(err, Error::DeleteDenied(_)));

    pool.close().await;
    let err = review::delete_volunteer(&pool, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn test_list_shows_unknown_when_member_missing() {
    let pool = setup().await;
    let id = register(&pool, "Ana", "5511911112222", true).await;

    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM members").execute(&pool).await.unwrap();

    let apps = review::list_applications(&pool).await.unwrap();
    assert_eq!(apps[0].id, id);
    assert_eq!(apps[0].answers.full_name, "Unknown");
}

#[tokio::test]
async fn test_board_updates_locally_and_in_store() {
    let pool = setup().await;
    let id = register(&pool, "Ana", "5511911112222", true).await;

    let mut board = ReviewBoard::load(&pool).await.unwrap();
    board.approve(&pool, id).await.unwrap();
    board.set_attendance(&pool, id, 2, true).await.unwrap();

    assert_eq!(board.applications()[0].status, PipelineStatus::Approved);
    assert_eq!(board.training()[0].classes, vec![false, true, false]);

    let reloaded = ReviewBoard::load(&pool).await.unwrap();
    assert_eq!(reloaded.applications(), board.applications());
    assert_eq!(reloaded.training(), board.training());
    assert_eq!(reloaded.stats().eligible, 1);
}

#[tokio::test]
async fn test_board_rolls_back_when_store_fails() {
    let pool = setup().await;
    let id = register(&pool, "Ana", "5511911112222", true).await;
    let mut board = ReviewBoard::load(&pool).await.unwrap();
    let before = board.applications()[0].clone();

    pool.close().await;

    let err = board.reject(&pool, id).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));
    assert_eq!(board.applications()[0], before);

    let err = board.set_attendance(&pool, id, 1, true).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));
    assert_eq!(board.training()[0].classes, vec![false; TRACKED_CLASSES as usize]);

    // Store delete fails first, so the row stays
    assert!(board.remove(&pool, id).await.is_err());
    assert_eq!(board.applications().len(), 1);
}
