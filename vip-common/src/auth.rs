//! Staff roles
//!
//! The upstream identity provider tells us who is signed in; this module
//! decides what that person may do. Anyone not on the allow-list gets no
//! role and is kept out of the admin area entirely.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Admin-area role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access including ministries and app settings
    Admin,
    /// Day-to-day review work; no configuration
    Secretary,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Secretary => "secretary",
        }
    }

    /// Manage ministry tags and app settings
    ///
    /// Every role may review and moderate applications; only this differs.
    pub fn can_configure(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Maps an identity to a role
pub trait RoleResolver: Send + Sync {
    /// `None` means the person has no access
    fn resolve_role(&self, identity: &Identity) -> Option<Role>;
}

/// One `[[staff]]` entry of the bootstrap config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffEntry {
    pub email: String,
    pub role: Role,
}

/// Email allow-list; emails compare ignoring case and surrounding whitespace
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    entries: HashMap<String, Role>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a StaffEntry>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            list.insert(&entry.email, entry.role);
        }
        list
    }

    pub fn insert(&mut self, email: &str, role: Role) {
        self.entries.insert(normalize_email(email), role);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RoleResolver for AllowList {
    fn resolve_role(&self, identity: &Identity) -> Option<Role> {
        self.entries.get(&normalize_email(&identity.email)).copied()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
