//! Database schema and table access

pub mod churches;
pub mod init;
pub mod members;
pub mod migrations;
pub mod volunteers;

pub use init::*;
pub use migrations::run_migrations;

use crate::{Error, Result};
use uuid::Uuid;

/// Parse a TEXT id column back into a Uuid
pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
}

/// Comparison key for names: trimmed and lowercased with full Unicode folding
///
/// SQLite's NOCASE only folds ASCII, so "JOÃO" and "João" would differ there.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
