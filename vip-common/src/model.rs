//! Intake data model
//!
//! Types shared by the wizard, the classifier, the store and the admin views.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Marital status as collected by the personal-data step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Single => "Single",
            MaritalStatus::Married => "Married",
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Widowed => "Widowed",
        }
    }

    /// Parse a stored label; unknown labels fall back to Single
    pub fn from_label(label: &str) -> Self {
        match label {
            "Married" => MaritalStatus::Married,
            "Divorced" => MaritalStatus::Divorced,
            "Widowed" => MaritalStatus::Widowed,
            _ => MaritalStatus::Single,
        }
    }
}

/// Answer to the confidential addiction question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddictionStatus {
    #[default]
    None,
    Alcohol,
    Tobacco,
    Other,
}

impl AddictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddictionStatus::None => "None",
            AddictionStatus::Alcohol => "Alcohol",
            AddictionStatus::Tobacco => "Tobacco",
            AddictionStatus::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Alcohol" => AddictionStatus::Alcohol,
            "Tobacco" => AddictionStatus::Tobacco,
            "Other" => AddictionStatus::Other,
            _ => AddictionStatus::None,
        }
    }
}

/// Everything the public wizard collects
///
/// Doubles as the wizard's in-progress form: string fields may be empty and
/// `birth_date` may be unset until the personal-data step validates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeAnswers {
    pub full_name: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub marital_status: MaritalStatus,
    pub dating: bool,
    pub partner_religion: String,
    pub baptized: bool,
    pub accepts_principles: bool,
    pub formation_school: bool,
    pub addiction: AddictionStatus,
    pub addiction_details: Option<String>,
    pub available_for_training: bool,
    pub ministry: String,
}

/// Pipeline stage of a volunteer application
///
/// The first five variants are classifier outcomes; `Approved` and `Rejected`
/// are set by admin review; `Custom` carries any other admin-entered label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PipelineStatus {
    RoutedToIntegration,
    AwaitingPastoralConversation,
    PendingFormationSchool,
    NotCurrentlyEligible,
    EligibleForFinalReview,
    Approved,
    Rejected,
    Custom(String),
}

impl PipelineStatus {
    pub fn label(&self) -> &str {
        match self {
            PipelineStatus::RoutedToIntegration => "Routed to Integration",
            PipelineStatus::AwaitingPastoralConversation => "Awaiting Pastoral Conversation",
            PipelineStatus::PendingFormationSchool => "Pending – Formation School",
            PipelineStatus::NotCurrentlyEligible => "Not currently eligible",
            PipelineStatus::EligibleForFinalReview => "Eligible for Final Review",
            PipelineStatus::Approved => "Approved",
            PipelineStatus::Rejected => "Rejected",
            PipelineStatus::Custom(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Routed to Integration" => PipelineStatus::RoutedToIntegration,
            "Awaiting Pastoral Conversation" => PipelineStatus::AwaitingPastoralConversation,
            "Pending – Formation School" => PipelineStatus::PendingFormationSchool,
            "Not currently eligible" => PipelineStatus::NotCurrentlyEligible,
            "Eligible for Final Review" => PipelineStatus::EligibleForFinalReview,
            "Approved" => PipelineStatus::Approved,
            "Rejected" => PipelineStatus::Rejected,
            other => PipelineStatus::Custom(other.to_string()),
        }
    }

    /// Statuses that appear on the training roster
    pub fn in_training_roster(&self) -> bool {
        matches!(
            self,
            PipelineStatus::PendingFormationSchool
                | PipelineStatus::RoutedToIntegration
                | PipelineStatus::EligibleForFinalReview
                | PipelineStatus::Approved
        )
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<PipelineStatus> for String {
    fn from(status: PipelineStatus) -> Self {
        status.label().to_string()
    }
}

impl From<String> for PipelineStatus {
    fn from(label: String) -> Self {
        PipelineStatus::from_label(&label)
    }
}

/// Status plus internal note, always written together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: PipelineStatus,
    pub note: String,
}

/// Canonical person record ("member")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub church_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub marital_status: MaritalStatus,
}

/// Stored volunteer application joined with its member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub member_id: Option<Uuid>,
    pub answers: IntakeAnswers,
    pub status: PipelineStatus,
    pub observation: String,
    pub registered_at: DateTime<Utc>,
}

/// Selectable ministry label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinistryTag {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

/// One row of the training roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub volunteer_id: Uuid,
    pub full_name: String,
    pub status: PipelineStatus,
    /// Completion per class, index 0 is class 1
    pub classes: Vec<bool>,
}
