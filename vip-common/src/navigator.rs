//! Intake wizard navigation
//!
//! Finite-state machine over the wizard steps. Branches (baptism, marital
//! status) are evaluated against the form as it is at the moment of
//! navigation, in both directions; no history is replayed.

use crate::error::FieldErrors;
use crate::model::{IntakeAnswers, MaritalStatus};
use serde::{Deserialize, Serialize};

/// In-progress answers; fields fill in as the applicant moves forward
pub type WizardForm = IntakeAnswers;

/// Wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    #[default]
    Welcome,
    Baptism,
    PersonalData,
    Relationship,
    Commitments,
    Confidential,
    Training,
    MinistryIdentification,
    Review,
    Success,
    IntegrationRedirect,
}

impl Step {
    /// Success and IntegrationRedirect end the wizard
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Success | Step::IntegrationRedirect)
    }
}

/// Outcome of a forward move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "step", rename_all = "snake_case")]
pub enum Transition {
    Step(Step),
    /// Review confirmed; the caller submits the registration
    Submit,
}

/// Check the fields that gate leaving `step`
pub fn validate_step(step: Step, form: &IntakeAnswers) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    match step {
        Step::PersonalData => {
            if form.full_name.trim().is_empty() {
                errors.insert("full_name", "Full name is required");
            }
            if form.birth_date.is_none() {
                errors.insert("birth_date", "Birth date is required");
            }
            if form.phone.trim().is_empty() {
                errors.insert("phone", "Phone is required");
            }
        }
        Step::Relationship if form.dating => {
            if form.partner_religion.trim().is_empty() {
                errors.insert("partner_religion", "Please provide the partner's religion");
            }
        }
        Step::MinistryIdentification => {
            if form.ministry.trim().is_empty() {
                errors.insert("ministry", "Please choose an option");
            }
        }
        _ => {}
    }

    errors.into_result()
}

/// Forward transition from `step`
///
/// Blocked transitions return the field errors and leave the step unchanged.
/// Terminal steps stay where they are.
pub fn next(step: Step, form: &IntakeAnswers) -> Result<Transition, FieldErrors> {
    validate_step(step, form)?;

    let target = match step {
        Step::Welcome => Step::Baptism,
        Step::Baptism => {
            if form.baptized {
                Step::PersonalData
            } else {
                Step::IntegrationRedirect
            }
        }
        Step::PersonalData => {
            if form.marital_status == MaritalStatus::Single {
                Step::Relationship
            } else {
                Step::Commitments
            }
        }
        Step::Relationship => Step::Commitments,
        Step::Commitments => Step::Confidential,
        Step::Confidential => Step::Training,
        Step::Training => Step::MinistryIdentification,
        Step::MinistryIdentification => Step::Review,
        Step::Review => return Ok(Transition::Submit),
        Step::Success | Step::IntegrationRedirect => step,
    };

    Ok(Transition::Step(target))
}

/// Backward transition from `step`, mirroring `next`
pub fn back(step: Step, form: &IntakeAnswers) -> Step {
    match step {
        Step::Baptism => Step::Welcome,
        Step::PersonalData => Step::Baptism,
        Step::Relationship => Step::PersonalData,
        Step::Commitments => {
            if form.marital_status == MaritalStatus::Single {
                Step::Relationship
            } else {
                Step::PersonalData
            }
        }
        Step::Confidential => Step::Commitments,
        Step::Training => Step::Confidential,
        Step::MinistryIdentification => Step::Training,
        Step::Review => Step::MinistryIdentification,
        Step::Welcome | Step::Success | Step::IntegrationRedirect => step,
    }
}

/// Stateful wizard: current step, form and the last validation errors
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    pub step: Step,
    pub form: IntakeAnswers,
    pub errors: FieldErrors,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward. Returns `Some(Transition::Submit)` when the review is
    /// confirmed, `None` when the step changed or was blocked.
    pub fn advance(&mut self) -> Option<Transition> {
        match next(self.step, &self.form) {
            Ok(Transition::Step(step)) => {
                self.errors = FieldErrors::new();
                self.step = step;
                None
            }
            Ok(Transition::Submit) => {
                self.errors = FieldErrors::new();
                Some(Transition::Submit)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Move backward, discarding validation errors
    pub fn retreat(&mut self) {
        self.errors = FieldErrors::new();
        self.step = back(self.step, &self.form);
    }

    /// Registration stored; show the success screen
    pub fn complete(&mut self) {
        self.step = Step::Success;
    }
}
