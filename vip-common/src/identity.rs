//! Identity resolution
//!
//! Matches a new submission to an existing member so repeat applicants do not
//! create duplicate person records. A phone long enough to be meaningful is
//! tried first as a substring of stored phones; otherwise (or on a miss) the
//! trimmed full name is compared ignoring case, accented letters included.

use crate::db::members;
use crate::model::Member;
use crate::Result;
use sqlx::SqliteConnection;
use tracing::debug;

/// Phones with this many digits or fewer are too ambiguous to search by
pub const MIN_PHONE_DIGITS: usize = 8;

/// Outcome of a lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Existing(Member),
    NotFound,
}

/// Keep only ASCII digits
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Find the member a submission belongs to
///
/// Runs on the caller's connection so it can take part in the registration
/// transaction.
pub async fn resolve(conn: &mut SqliteConnection, phone: &str, name: &str) -> Result<Resolution> {
    let digits = normalize_phone(phone);

    if digits.len() > MIN_PHONE_DIGITS {
        if let Some(member) = members::find_by_phone_fragment(&mut *conn, &digits).await? {
            debug!(member_id = %member.id, "Matched member by phone");
            return Ok(Resolution::Existing(member));
        }
    }

    let name = name.trim();
    if name.is_empty() {
        return Ok(Resolution::NotFound);
    }

    match members::find_by_name(&mut *conn, name).await? {
        Some(member) => {
            debug!(member_id = %member.id, "Matched member by name");
            Ok(Resolution::Existing(member))
        }
        None => Ok(Resolution::NotFound),
    }
}
