//! Registration status classifier
//!
//! Maps intake answers to a pipeline stage and internal note. Only four
//! answers are decision-bearing: baptism, acceptance of principles, formation
//! school and training availability. The first failing check wins, in that
//! order. Addiction, relationship and ministry answers are recorded elsewhere
//! and never consulted here.

use crate::model::{Classification, IntakeAnswers, PipelineStatus};

pub const NOTE_INTEGRATION: &str = "Needs contact from the Integration Ministry";
pub const NOTE_PASTORAL: &str = "Schedule pastoral conversation";
pub const NOTE_FORMATION_SCHOOL: &str = "Needs to regularize Formation School";
pub const NOTE_TRAINING_AVAILABILITY: &str = "Discuss training availability";
pub const NOTE_CLEARED: &str = "Cleared for volunteer process";

/// Classify a submission. Pure: the caller stamps the registration time.
pub fn classify(answers: &IntakeAnswers) -> Classification {
    let (status, note) = if !answers.baptized {
        (PipelineStatus::RoutedToIntegration, NOTE_INTEGRATION)
    } else if !answers.accepts_principles {
        (PipelineStatus::AwaitingPastoralConversation, NOTE_PASTORAL)
    } else if !answers.formation_school {
        (PipelineStatus::PendingFormationSchool, NOTE_FORMATION_SCHOOL)
    } else if !answers.available_for_training {
        (PipelineStatus::NotCurrentlyEligible, NOTE_TRAINING_AVAILABILITY)
    } else {
        (PipelineStatus::EligibleForFinalReview, NOTE_CLEARED)
    };

    Classification {
        status,
        note: note.to_string(),
    }
}
