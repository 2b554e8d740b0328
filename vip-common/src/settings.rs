//! Application settings service
//!
//! App name, organization name, logo and the registration window. The
//! service answers from a local copy straight away (the TOML cache file, or
//! defaults), reconciles against the `app_settings` row when asked, and writes
//! every local change through to both the cache and the database. A change
//! the database refuses is undone locally, so the local copy never claims a
//! state the registration check does not see.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteExecutor, SqlitePool};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};

pub const DEFAULT_APP_NAME: &str = "Volunteer Portal";
pub const DEFAULT_ORG_NAME: &str = "Word of Life Ministry";

/// Settings visible to the public form and the admin header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub app_name: String,
    pub org_name: String,
    pub logo_url: Option<String>,
    pub registration_open: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            org_name: DEFAULT_ORG_NAME.to_string(),
            logo_url: None,
            registration_open: true,
        }
    }
}

/// Partial change; `None` leaves a field alone
///
/// `logo_url: Some(None)` clears the logo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub app_name: Option<String>,
    pub org_name: Option<String>,
    #[serde(with = "double_option")]
    pub logo_url: Option<Option<String>>,
    pub registration_open: Option<bool>,
}

impl SettingsUpdate {
    fn apply(&self, settings: &mut AppSettings) -> Result<()> {
        if let Some(name) = &self.app_name {
            settings.app_name = non_empty("app_name", name)?;
        }
        if let Some(name) = &self.org_name {
            settings.org_name = non_empty("org_name", name)?;
        }
        if let Some(logo) = &self.logo_url {
            settings.logo_url = logo
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string);
        }
        if let Some(open) = self.registration_open {
            settings.registration_open = open;
        }
        Ok(())
    }
}

fn non_empty(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}

/// Distinguishes an absent field from an explicit `null`
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Read the settings row; NULL columns take their defaults
pub async fn load_app_settings<'e, E>(executor: E) -> Result<AppSettings>
where
    E: SqliteExecutor<'e>,
{
    let defaults = AppSettings::default();
    let row = sqlx::query(
        "SELECT app_name, org_name, logo_url, registration_open FROM app_settings WHERE id = 1",
    )
    .fetch_optional(executor)
    .await?;

    let Some(row) = row else {
        return Ok(defaults);
    };

    let app_name: Option<String> = row.try_get("app_name")?;
    let org_name: Option<String> = row.try_get("org_name")?;
    let logo_url: Option<String> = row.try_get("logo_url")?;
    let registration_open: Option<bool> = row.try_get("registration_open")?;

    Ok(AppSettings {
        app_name: app_name.unwrap_or(defaults.app_name),
        org_name: org_name.unwrap_or(defaults.org_name),
        logo_url,
        registration_open: registration_open.unwrap_or(defaults.registration_open),
    })
}

/// Write every field of the settings row
pub async fn save_app_settings<'e, E>(executor: E, settings: &AppSettings) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO app_settings (id, app_name, org_name, logo_url, registration_open, updated_at)
        VALUES (1, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(id) DO UPDATE SET
            app_name = excluded.app_name,
            org_name = excluded.org_name,
            logo_url = excluded.logo_url,
            registration_open = excluded.registration_open,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&settings.app_name)
    .bind(&settings.org_name)
    .bind(&settings.logo_url)
    .bind(settings.registration_open)
    .execute(executor)
    .await?;

    Ok(())
}

/// Shared settings with a local cache in front of the database
#[derive(Clone)]
pub struct SettingsService {
    db: SqlitePool,
    cache_path: Option<PathBuf>,
    current: Arc<RwLock<AppSettings>>,
}

impl SettingsService {
    /// Start from the cache file, or defaults when it is missing or unreadable
    pub fn load_cached(db: SqlitePool, cache_path: Option<PathBuf>) -> Self {
        let initial = cache_path
            .as_deref()
            .and_then(read_cache)
            .unwrap_or_default();

        Self {
            db,
            cache_path,
            current: Arc::new(RwLock::new(initial)),
        }
    }

    /// Snapshot of the local copy
    pub fn current(&self) -> AppSettings {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the local copy with what the database holds
    ///
    /// On failure the local copy is kept and the error returned.
    pub async fn reconcile(&self) -> Result<AppSettings> {
        let remote = load_app_settings(&self.db).await.map_err(|e| {
            error!("Failed to load app settings: {}", e);
            e
        })?;

        if remote != self.current() {
            info!(app_name = %remote.app_name, "App settings refreshed from database");
        }
        self.replace_local(remote.clone());
        self.write_cache(&remote);
        Ok(remote)
    }

    /// Apply a change locally, then write it to the cache and the database
    ///
    /// If the database write fails the previous local copy and cache are
    /// restored and the error is returned.
    pub async fn update(&self, update: &SettingsUpdate) -> Result<AppSettings> {
        let previous = self.current();
        let mut next = previous.clone();
        update.apply(&mut next)?;

        self.replace_local(next.clone());
        self.write_cache(&next);

        if let Err(e) = save_app_settings(&self.db, &next).await {
            error!("Failed to save app settings, rolling back: {}", e);
            self.replace_local(previous.clone());
            self.write_cache(&previous);
            return Err(e);
        }

        debug!("App settings saved");
        Ok(next)
    }

    fn replace_local(&self, settings: AppSettings) {
        match self.current.write() {
            Ok(mut guard) => *guard = settings,
            Err(poisoned) => *poisoned.into_inner() = settings,
        }
    }

    fn write_cache(&self, settings: &AppSettings) {
        let Some(path) = &self.cache_path else {
            return;
        };
        if let Err(e) = write_cache(path, settings) {
            warn!("Could not write settings cache {}: {}", path.display(), e);
        }
    }
}

fn read_cache(path: &Path) -> Option<AppSettings> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!("Ignoring unreadable settings cache {}: {}", path.display(), e);
            None
        }
    }
}

fn write_cache(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string(settings)
        .map_err(|e| Error::Internal(format!("Failed to serialize settings: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn test_seeded_row_reads_as_defaults() {
        let pool = connect_in_memory().await.unwrap();
        let settings = load_app_settings(&pool).await.unwrap();
        assert_eq!(settings, AppSettings::default());
        assert!(settings.registration_open);
    }

    #[tokio::test]
    async fn test_update_writes_through_to_cache_and_db() {
        let pool = connect_in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("settings.toml");

        let service = SettingsService::load_cached(pool.clone(), Some(cache.clone()));
        let update = SettingsUpdate {
            org_name: Some("Hope Church".to_string()),
            registration_open: Some(false),
            ..Default::default()
        };
        let saved = service.update(&update).await.unwrap();

        assert_eq!(saved.org_name, "Hope Church");
        assert_eq!(service.current(), saved);
        assert_eq!(load_app_settings(&pool).await.unwrap(), saved);

        // A fresh service starts from the cache before touching the database
        let restarted = SettingsService::load_cached(pool, Some(cache));
        assert!(!restarted.current().registration_open);
    }

    #[tokio::test]
    async fn test_reconcile_replaces_local_copy() {
        let pool = connect_in_memory().await.unwrap();
        let service = SettingsService::load_cached(pool.clone(), None);

        let mut remote = AppSettings::default();
        remote.app_name = "Serve Portal".to_string();
        save_app_settings(&pool, &remote).await.unwrap();

        assert_eq!(service.current().app_name, DEFAULT_APP_NAME);
        service.reconcile().await.unwrap();
        assert_eq!(service.current().app_name, "Serve Portal");
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_local_change() {
        let pool = connect_in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("settings.toml");
        let service = SettingsService::load_cached(pool.clone(), Some(cache.clone()));

        sqlx::query(
            "CREATE TRIGGER refuse_settings BEFORE UPDATE ON app_settings \
             BEGIN SELECT RAISE(ABORT, 'settings locked'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let update = SettingsUpdate {
            registration_open: Some(false),
            ..Default::default()
        };
        let result = service.update(&update).await;

        assert!(matches!(result, Err(Error::Database(_))));
        assert!(service.current().registration_open);
        assert!(load_app_settings(&pool).await.unwrap().registration_open);
        assert_eq!(read_cache(&cache), Some(AppSettings::default()));
    }

    #[tokio::test]
    async fn test_failed_save_on_closed_pool_keeps_previous() {
        let pool = connect_in_memory().await.unwrap();
        let service = SettingsService::load_cached(pool.clone(), None);
        pool.close().await;

        let update = SettingsUpdate {
            app_name: Some("Offline Name".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.update(&update).await, Err(Error::Database(_))));
        assert_eq!(service.current().app_name, DEFAULT_APP_NAME);
    }

    #[tokio::test]
    async fn test_empty_name_rejected_without_change() {
        let pool = connect_in_memory().await.unwrap();
        let service = SettingsService::load_cached(pool, None);

        let update = SettingsUpdate {
            app_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.update(&update).await, Err(Error::InvalidInput(_))));
        assert_eq!(service.current().app_name, DEFAULT_APP_NAME);
    }

    #[test]
    fn test_update_json_distinguishes_null_logo() {
        let clear: SettingsUpdate = serde_json::from_str(r#"{"logo_url": null}"#).unwrap();
        assert_eq!(clear.logo_url, Some(None));

        let untouched: SettingsUpdate = serde_json::from_str(r#"{"app_name": "X"}"#).unwrap();
        assert_eq!(untouched.logo_url, None);
    }

    #[test]
    fn test_corrupt_cache_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("settings.toml");
        std::fs::write(&cache, "app_name = [").unwrap();
        assert_eq!(read_cache(&cache), None);
    }
}
