//! Registration transaction
//!
//! Turns a completed wizard into a stored application: classify, find or
//! create the member, write the application. Everything after the settings
//! check runs in one database transaction, so a failure leaves no application
//! pointing at a member that was never created. The transaction takes the
//! write lock before the member lookup, so concurrent submissions queue up
//! behind each other instead of racing to create the same member.

use crate::classifier::classify;
use crate::db::{churches, members, volunteers};
use crate::error::FieldErrors;
use crate::identity::{self, Resolution};
use crate::model::{AddictionStatus, Classification, IntakeAnswers, MaritalStatus, Member};
use crate::navigator::{validate_step, Step};
use crate::settings::load_app_settings;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info};
use uuid::Uuid;

/// Outcome of a successful registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredApplication {
    pub application_id: Uuid,
    pub member: Member,
    /// True when the submission matched an existing member
    pub existing_member: bool,
    pub classification: Classification,
    pub registered_at: DateTime<Utc>,
}

/// Check the whole submission, not just the current step
///
/// Only steps the wizard actually shows are checked: the relationship step
/// exists for single applicants only.
pub fn validate_submission(answers: &IntakeAnswers) -> std::result::Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let mut steps = vec![Step::PersonalData];
    if answers.marital_status == MaritalStatus::Single {
        steps.push(Step::Relationship);
    }
    steps.push(Step::MinistryIdentification);

    for step in steps {
        if let Err(step_errors) = validate_step(step, answers) {
            for (field, message) in step_errors.iter() {
                errors.insert(field, message);
            }
        }
    }

    if answers.addiction == AddictionStatus::Other
        && answers
            .addiction_details
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
    {
        errors.insert("addiction_details", "Please describe");
    }

    errors.into_result()
}

/// Store a submission
///
/// Fails with `RegistrationClosed` when the registration window is shut,
/// `Validation` when required answers are missing and `Config` when there
/// is no church to attach a new member to.
pub async fn process_registration(
    pool: &SqlitePool,
    answers: &IntakeAnswers,
) -> Result<RegisteredApplication> {
    let settings = load_app_settings(pool).await?;
    if !settings.registration_open {
        return Err(Error::RegistrationClosed);
    }

    validate_submission(answers)?;

    let classification = classify(answers);
    let registered_at = Utc::now();
    let application_id = Uuid::new_v4();

    // IMMEDIATE: a deferred transaction would read first and then fail with
    // SQLITE_BUSY when upgrading to a write under contention
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let resolution = identity::resolve(&mut tx, &answers.phone, &answers.full_name).await?;
    let (member, existing_member) = match resolution {
        Resolution::Existing(mut member) => {
            members::refresh_member(&mut *tx, member.id, answers).await?;
            member.marital_status = answers.marital_status;
            member.birth_date = answers.birth_date;
            member.phone = Some(answers.phone.clone()).filter(|p| !p.is_empty());
            (member, true)
        }
        Resolution::NotFound => {
            let church_id = churches::first_church_id(&mut *tx).await?.ok_or_else(|| {
                error!("Registration aborted: no church configured for new members");
                Error::Config("No church exists to attach new members to".to_string())
            })?;
            let member = members::insert_member(&mut *tx, church_id, answers).await?;
            (member, false)
        }
    };

    volunteers::insert_application(
        &mut *tx,
        application_id,
        member.id,
        answers,
        &classification,
        registered_at,
    )
    .await?;

    tx.commit().await?;

    info!(
        volunteer_id = %application_id,
        member_id = %member.id,
        existing_member,
        status = %classification.status,
        "Registered volunteer application"
    );

    Ok(RegisteredApplication {
        application_id,
        member,
        existing_member,
        classification,
        registered_at,
    })
}
