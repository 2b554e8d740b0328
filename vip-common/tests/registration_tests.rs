//! Integration tests for the registration transaction
//!
//! Each test starts from an in-memory database with the real schema, except
//! the concurrency test, which needs a file database with several connections.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use vip_common::db::{churches, connect_in_memory, init_database, members, volunteers};
use vip_common::model::{MaritalStatus, PipelineStatus};
use vip_common::registration::process_registration;
use vip_common::settings::{save_app_settings, AppSettings};
use vip_common::{Error, IntakeAnswers};

async fn setup() -> SqlitePool {
    let pool = connect_in_memory().await.unwrap();
    churches::add_church(&pool, "Central").await.unwrap();
    pool
}

fn maria() -> IntakeAnswers {
    IntakeAnswers {
        full_name: "Maria".to_string(),
        phone: "5511999999999".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1992, 8, 14),
        marital_status: MaritalStatus::Single,
        baptized: true,
        accepts_principles: true,
        formation_school: false,
        available_for_training: true,
        ministry: "Worship".to_string(),
        ..Default::default()
    }
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_new_applicant_creates_member_and_linked_application() {
    let pool = setup().await;

    let registered = process_registration(&pool, &maria()).await.unwrap();

    assert_eq!(
        registered.classification.status,
        PipelineStatus::PendingFormationSchool
    );
    assert!(!registered.existing_member);
    assert_eq!(registered.member.name, "Maria");
    assert_eq!(count(&pool, "members").await, 1);

    let stored = volunteers::get_application(&pool, registered.application_id)
        .await
        .unwrap()
        .expect("application stored");
    assert_eq!(stored.member_id, Some(registered.member.id));
    assert_eq!(stored.status.label(), "Pending – Formation School");
    assert_eq!(stored.observation, "Needs to regularize Formation School");
    assert_eq!(stored.answers.full_name, "Maria");
    assert_eq!(stored.answers.ministry, "Worship");
}

#[tokio::test]
async fn test_repeat_applicant_reuses_member_and_refreshes_details() {
    let pool = setup().await;
    let first = process_registration(&pool, &maria()).await.unwrap();

    let mut again = maria();
    again.full_name = "Maria S.".to_string();
    again.phone = "+55 (11) 99999-9999".to_string();
    again.marital_status = MaritalStatus::Married;
    again.formation_school = true;

    let second = process_registration(&pool, &again).await.unwrap();

    assert!(second.existing_member);
    assert_eq!(second.member.id, first.member.id);
    assert_eq!(
        second.classification.status,
        PipelineStatus::EligibleForFinalReview
    );
    assert_eq!(count(&pool, "members").await, 1);
    assert_eq!(count(&pool, "volunteers").await, 2);

    let member = members::get_member(&pool, first.member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.marital_status, MaritalStatus::Married);
    assert_eq!(member.phone.as_deref(), Some("+55 (11) 99999-9999"));
    // Name is never overwritten by a later submission
    assert_eq!(member.name, "Maria");
}

#[tokio::test]
async fn test_unbaptized_applicant_is_routed_to_integration() {
    let pool = setup().await;
    let mut answers = maria();
    answers.baptized = false;

    let registered = process_registration(&pool, &answers).await.unwrap();
    assert_eq!(
        registered.classification.status,
        PipelineStatus::RoutedToIntegration
    );
}

#[tokio::test]
async fn test_closed_registration_is_refused() {
    let pool = setup().await;
    let settings = AppSettings {
        registration_open: false,
        ..Default::default()
    };
    save_app_settings(&pool, &settings).await.unwrap();

    let err = process_registration(&pool, &maria()).await.unwrap_err();
    assert!(matches!(err, Error::RegistrationClosed));
    assert_eq!(count(&pool, "volunteers").await, 0);
}

#[tokio::test]
async fn test_incomplete_submission_touches_nothing() {
    let pool = setup().await;
    let mut answers = maria();
    answers.phone.clear();

    let err = process_registration(&pool, &answers).await.unwrap_err();
    match err {
        Error::Validation(fields) => assert!(fields.get("phone").is_some()),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(count(&pool, "members").await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("vip.db")).await.unwrap();
    churches::add_church(&pool, "Central").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let mut answers = maria();
            answers.full_name = format!("Applicant {}", i);
            answers.phone = format!("55119{:08}", i);
            process_registration(&pool, &answers).await
        }));
    }
    // One person submitting several times at once must end up as one member
    for _ in 0..10 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            process_registration(&pool, &maria()).await
        }));
    }

    let mut failures = Vec::new();
    for handle in handles {
        if let Err(e) = handle.await.unwrap() {
            failures.push(e.to_string());
        }
    }
    assert!(failures.is_empty(), "failed submissions: {:?}", failures);

    assert_eq!(count(&pool, "volunteers").await, 30);
    assert_eq!(count(&pool, "members").await, 21);
}

#[tokio::test]
async fn test_married_applicant_with_stale_dating_answer_is_accepted() {
    let pool = setup().await;
    let mut answers = maria();
    answers.dating = true;
    answers.partner_religion.clear();
    answers.marital_status = MaritalStatus::Married;

    let registered = process_registration(&pool, &answers).await.unwrap();
    assert!(!registered.existing_member);
    assert_eq!(count(&pool, "volunteers").await, 1);
}

#[tokio::test]
async fn test_name_match_ignores_accented_case() {
    let pool = setup().await;
    let mut first = maria();
    first.full_name = "João Álvares".to_string();
    first.phone = "1234".to_string();
    let first = process_registration(&pool, &first).await.unwrap();

    let mut again = maria();
    again.full_name = "JOÃO ÁLVARES".to_string();
    again.phone = "1234".to_string();
    let again = process_registration(&pool, &again).await.unwrap();

    assert!(again.existing_member);
    assert_eq!(again.member.id, first.member.id);
    assert_eq!(count(&pool, "members").await, 1);
}
