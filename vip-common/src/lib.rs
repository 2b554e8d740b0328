//! # VIP Common Library
//!
//! Shared code for the Volunteer Intake Portal including:
//! - Intake data model and pipeline statuses
//! - Status classification and wizard navigation (pure)
//! - Identity resolution and the registration transaction
//! - Training attendance tracking and admin review operations
//! - Configuration loading (bootstrap TOML and app settings)
//! - Database schema and migrations

pub mod auth;
pub mod classifier;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod export;
pub mod identity;
pub mod ministry;
pub mod model;
pub mod navigator;
pub mod registration;
pub mod review;
pub mod settings;
pub mod training;

pub use error::{Error, FieldErrors, Result};
pub use model::{IntakeAnswers, PipelineStatus};
