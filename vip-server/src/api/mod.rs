//! HTTP API handlers for vip-server

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod ministries;
pub mod registration;
pub mod settings;
pub mod training;
pub mod volunteers;
pub mod wizard;

pub use auth::Staff;
