//! Admin dashboard
//!
//! Statistics and filtering over the loaded application list, canned
//! applicant messages, and the `ReviewBoard`: the admin's local view of
//! applications and training, kept in step with the store through optimistic
//! updates that roll back when the write fails.

use crate::model::{ApplicationRecord, PipelineStatus, TrainingRecord};
use crate::{review, training, Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::{error, warn};
use uuid::Uuid;

/// Ministry bucket for applications that named none
pub const UNSPECIFIED_MINISTRY: &str = "Not specified";

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    /// Eligible for Final Review or Approved
    pub eligible: usize,
    pub integration: usize,
    pub formation_school: usize,
    pub eligible_pct: f64,
    pub integration_pct: f64,
    pub formation_school_pct: f64,
    pub by_ministry: BTreeMap<String, usize>,
}

impl DashboardStats {
    pub fn compute(applications: &[ApplicationRecord]) -> Self {
        let total = applications.len();
        let count = |wanted: &[PipelineStatus]| {
            applications
                .iter()
                .filter(|a| wanted.contains(&a.status))
                .count()
        };

        let eligible = count(&[
            PipelineStatus::EligibleForFinalReview,
            PipelineStatus::Approved,
        ][..]);
        let integration = count(&[PipelineStatus::RoutedToIntegration][..]);
        let formation_school = count(&[PipelineStatus::PendingFormationSchool][..]);

        let divisor = total.max(1) as f64;
        let pct = |n: usize| n as f64 / divisor * 100.0;

        let mut by_ministry = BTreeMap::new();
        for app in applications {
            let ministry = app.answers.ministry.trim();
            let key = if ministry.is_empty() {
                UNSPECIFIED_MINISTRY
            } else {
                ministry
            };
            *by_ministry.entry(key.to_string()).or_insert(0) += 1;
        }

        Self {
            total,
            eligible,
            integration,
            formation_school,
            eligible_pct: pct(eligible),
            integration_pct: pct(integration),
            formation_school_pct: pct(formation_school),
            by_ministry,
        }
    }
}

/// Applications whose name or status label contains `query`, ignoring case
///
/// An empty query keeps everything.
pub fn filter_applications<'a>(
    applications: &'a [ApplicationRecord],
    query: &str,
) -> Vec<&'a ApplicationRecord> {
    let needle = query.trim().to_lowercase();
    applications
        .iter()
        .filter(|app| {
            needle.is_empty()
                || app.answers.full_name.to_lowercase().contains(&needle)
                || app.status.label().to_lowercase().contains(&needle)
        })
        .collect()
}

/// Message the staff send the applicant for their current status
pub fn contact_message(status: &PipelineStatus) -> &'static str {
    match status {
        PipelineStatus::RoutedToIntegration => {
            "Hello! We received your registration. To continue as a volunteer we need to walk \
             together through the integration process. Our team will contact you soon."
        }
        PipelineStatus::PendingFormationSchool => {
            "Your registration was received with joy! To move forward you need to be enrolled \
             in the Formation School. We are here for any questions."
        }
        PipelineStatus::EligibleForFinalReview => {
            "Great news! Your registration has moved to the next stage of the volunteer \
             process. We will be in touch soon with more details."
        }
        PipelineStatus::Approved => {
            "Congratulations! Your volunteer registration has been APPROVED. Welcome to the \
             serving team!"
        }
        PipelineStatus::Rejected => {
            "Hello, this is the volunteer team. We would like to talk with you about your \
             registration."
        }
        _ => "Hello from the volunteer team! We would like to talk with you about your registration.",
    }
}

/// Admin's local copy of applications and training progress
#[derive(Debug, Clone, Default)]
pub struct ReviewBoard {
    applications: Vec<ApplicationRecord>,
    training: Vec<TrainingRecord>,
}

impl ReviewBoard {
    pub fn new(applications: Vec<ApplicationRecord>, training: Vec<TrainingRecord>) -> Self {
        Self {
            applications,
            training,
        }
    }

    /// Fresh board from the store
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let applications = review::list_applications(pool).await?;
        let training = training::get_progress(pool).await?;
        Ok(Self::new(applications, training))
    }

    pub fn applications(&self) -> &[ApplicationRecord] {
        &self.applications
    }

    pub fn training(&self) -> &[TrainingRecord] {
        &self.training
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.applications)
    }

    /// Change a status locally, then in the store
    ///
    /// If the store write fails the previous status and note are restored and
    /// the error is returned.
    pub async fn set_status(
        &mut self,
        pool: &SqlitePool,
        volunteer_id: Uuid,
        status: PipelineStatus,
        note: &str,
    ) -> Result<()> {
        let app = self
            .applications
            .iter_mut()
            .find(|a| a.id == volunteer_id)
            .ok_or_else(|| Error::NotFound(format!("volunteer {}", volunteer_id)))?;

        let previous = (app.status.clone(), app.observation.clone());
        app.status = status.clone();
        app.observation = note.to_string();

        let written = match &status {
            PipelineStatus::Approved if note == review::APPROVED_NOTE => {
                review::approve(pool, volunteer_id).await
            }
            PipelineStatus::Rejected if note == review::REJECTED_NOTE => {
                review::reject(pool, volunteer_id).await
            }
            other => review::set_status(pool, volunteer_id, other.label(), note)
                .await
                .map(|_| ()),
        };

        if let Err(e) = written {
            error!(volunteer_id = %volunteer_id, "Status update failed, rolling back: {}", e);
            if let Some(app) = self.applications.iter_mut().find(|a| a.id == volunteer_id) {
                app.status = previous.0;
                app.observation = previous.1;
            }
            return Err(e);
        }

        Ok(())
    }

    pub async fn approve(&mut self, pool: &SqlitePool, volunteer_id: Uuid) -> Result<()> {
        self.set_status(pool, volunteer_id, PipelineStatus::Approved, review::APPROVED_NOTE)
            .await
    }

    pub async fn reject(&mut self, pool: &SqlitePool, volunteer_id: Uuid) -> Result<()> {
        self.set_status(pool, volunteer_id, PipelineStatus::Rejected, review::REJECTED_NOTE)
            .await
    }

    /// Toggle a class locally, then in the store; rolls back on failure
    pub async fn set_attendance(
        &mut self,
        pool: &SqlitePool,
        volunteer_id: Uuid,
        class_number: u32,
        completed: bool,
    ) -> Result<()> {
        let index = class_number
            .checked_sub(1)
            .map(|i| i as usize)
            .filter(|i| *i < training::TRACKED_CLASSES as usize)
            .ok_or_else(|| {
                Error::InvalidInput(format!("class number {} out of range", class_number))
            })?;

        let record = self
            .training
            .iter_mut()
            .find(|t| t.volunteer_id == volunteer_id)
            .ok_or_else(|| Error::NotFound(format!("training record {}", volunteer_id)))?;

        let previous = record.classes[index];
        record.classes[index] = completed;

        if let Err(e) = training::set_attendance(pool, volunteer_id, class_number, completed).await
        {
            error!(volunteer_id = %volunteer_id, class_number, "Attendance update failed, rolling back: {}", e);
            if let Some(record) = self.training.iter_mut().find(|t| t.volunteer_id == volunteer_id) {
                record.classes[index] = previous;
            }
            return Err(e);
        }

        Ok(())
    }

    /// Delete in the store first; the local row goes only once that succeeds
    pub async fn remove(&mut self, pool: &SqlitePool, volunteer_id: Uuid) -> Result<()> {
        if let Err(e) = review::delete_volunteer(pool, volunteer_id).await {
            warn!(volunteer_id = %volunteer_id, "Delete failed, keeping row: {}", e);
            return Err(e);
        }

        self.applications.retain(|a| a.id != volunteer_id);
        self.training.retain(|t| t.volunteer_id != volunteer_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IntakeAnswers;
    use chrono::Utc;

    fn app(name: &str, status: PipelineStatus, ministry: &str) -> ApplicationRecord {
        ApplicationRecord {
            id: Uuid::new_v4(),
            member_id: None,
            answers: IntakeAnswers {
                full_name: name.to_string(),
                ministry: ministry.to_string(),
                ..Default::default()
            },
            status,
            observation: String::new(),
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_stats_on_empty_list() {
        let stats = DashboardStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.eligible_pct, 0.0);
        assert!(stats.by_ministry.is_empty());
    }

    #[test]
    fn test_stats_counts_and_percentages() {
        let apps = vec![
            app("A", PipelineStatus::Approved, "Worship"),
            app("B", PipelineStatus::EligibleForFinalReview, "Worship"),
            app("C", PipelineStatus::RoutedToIntegration, ""),
            app("D", PipelineStatus::PendingFormationSchool, "Kids"),
        ];
        let stats = DashboardStats::compute(&apps);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.eligible, 2);
        assert_eq!(stats.integration, 1);
        assert_eq!(stats.formation_school, 1);
        assert_eq!(stats.eligible_pct, 50.0);
        assert_eq!(stats.integration_pct, 25.0);
        assert_eq!(stats.by_ministry.get("Worship"), Some(&2));
        assert_eq!(stats.by_ministry.get(UNSPECIFIED_MINISTRY), Some(&1));
    }

    #[test]
    fn test_filter_matches_name_or_status() {
        let apps = vec![
            app("Maria Souza", PipelineStatus::Approved, ""),
            app("João", PipelineStatus::RoutedToIntegration, ""),
        ];

        let by_name = filter_applications(&apps, "maria");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].answers.full_name, "Maria Souza");

        let by_status = filter_applications(&apps, "INTEGRATION");
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].answers.full_name, "João");

        assert_eq!(filter_applications(&apps, "  ").len(), 2);
    }

    #[test]
    fn test_contact_message_default() {
        let custom = PipelineStatus::Custom("On hold".to_string());
        assert!(contact_message(&custom).starts_with("Hello from the volunteer team"));
        assert!(contact_message(&PipelineStatus::Approved).contains("APPROVED"));
    }
}
