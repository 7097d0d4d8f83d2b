use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::context::TenantContext;
use crate::db::DocumentDb;
use crate::error::{CommandError, ErrorType, ServiceError};
use crate::services::tenants;
use crate::types::Config;

/// Shared application state: configuration, the store and the current tenant.
pub struct AppState {
    pub config: Mutex<Option<Config>>,
    pub db: Mutex<Option<DocumentDb>>,
    pub context: TenantContext,
}

impl AppState {
    pub fn new() -> Self {
        let config = load_config().ok();
        let db_path = config
            .as_ref()
            .and_then(|c| c.database_path.as_ref())
            .map(PathBuf::from);

        let opened = match db_path {
            Some(path) => DocumentDb::open_at(path),
            None => DocumentDb::open(),
        };
        let db = match opened {
            Ok(db) => Some(db),
            Err(e) => {
                log::warn!("Failed to open database: {e}. Data features disabled.");
                None
            }
        };

        let state = Self::from_parts(config, db);
        state.bind_startup_tenant();
        state
    }

    /// Assemble state without touching `~/.chefflow`. The tenant stays unresolved.
    pub fn from_parts(config: Option<Config>, db: Option<DocumentDb>) -> Self {
        Self {
            config: Mutex::new(config),
            db: Mutex::new(db),
            context: TenantContext::new(),
        }
    }

    /// Resolve the tenant from config: `defaultTenant` wins, otherwise the
    /// profile of `userId`. Leaves the context unresolved when neither works.
    pub fn bind_startup_tenant(&self) -> Option<String> {
        let config = match self.config.lock() {
            Ok(guard) => guard.clone().unwrap_or_default(),
            Err(_) => return None,
        };

        if let Some(tenant_id) = config.default_tenant.as_deref() {
            let tenant_id = crate::tenant::normalize_tenant_name(tenant_id);
            return match self.context.switch_tenant(Some(&tenant_id)) {
                Ok(()) => Some(tenant_id),
                Err(e) => {
                    log::warn!("Ignoring defaultTenant: {e}");
                    None
                }
            };
        }

        let user_id = config.user_id?;
        let result = self.with_db(|db, ctx| tenants::resolve_tenant_for_user(db, ctx, &user_id));
        match result {
            Ok(resolved) => resolved,
            Err(e) => {
                log::warn!("Could not resolve restaurant for {}: {}", user_id, e.message);
                None
            }
        }
    }

    /// Run a service call against the store and the current tenant, mapping
    /// failures to their UI form.
    pub fn with_db<T>(
        &self,
        f: impl FnOnce(&DocumentDb, &TenantContext) -> Result<T, ServiceError>,
    ) -> Result<T, CommandError> {
        let guard = self.db.lock().map_err(|_| unavailable("Database lock poisoned"))?;
        let db = guard
            .as_ref()
            .ok_or_else(|| unavailable("Database is not available"))?;
        f(db, &self.context).map_err(|e| CommandError::from(&e))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable(message: &str) -> CommandError {
    CommandError {
        message: message.to_string(),
        error_type: ErrorType::Fatal,
        can_retry: false,
        recovery_suggestion: "Check databasePath in ~/.chefflow/config.json".to_string(),
    }
}

/// Path of the config file: `~/.chefflow/config.json`.
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".chefflow").join("config.json"))
}

/// Load configuration from ~/.chefflow/config.json
pub fn load_config() -> Result<Config, String> {
    let config_path = config_path()?;

    if !config_path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"defaultTenant\": \"my-restaurant\" }}",
            config_path.display()
        ));
    }

    let content =
        fs::read_to_string(&config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Apply `mutator` to the current config (or a default one), write it to
/// disk and keep it in memory.
pub fn create_or_update_config(
    state: &AppState,
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, String> {
    let mut guard = state.config.lock().map_err(|_| "Lock poisoned")?;
    let mut config = guard.clone().unwrap_or_default();
    mutator(&mut config);

    let path = config_path()?;
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config dir: {}", e))?;
        }
    }

    let content = serde_json::to_string_pretty(&config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;

    *guard = Some(config.clone());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::services::prep;

    #[test]
    fn test_default_tenant_is_normalized_and_bound() {
        let config = Config {
            default_tenant: Some("Joe's Cafe".into()),
            ..Default::default()
        };
        let state = AppState::from_parts(Some(config), Some(test_db()));
        assert_eq!(state.bind_startup_tenant().as_deref(), Some("joes-cafe"));
        assert_eq!(state.context.tenant_id().as_deref(), Some("joes-cafe"));
    }

    #[test]
    fn test_user_profile_decides_tenant() {
        let db = test_db();
        tenants::register_tenant(&db, "Golden Dragon").unwrap();
        tenants::assign_user_tenant(&db, "uid-1", "golden-dragon").unwrap();
        let config = Config {
            user_id: Some("uid-1".into()),
            ..Default::default()
        };
        let state = AppState::from_parts(Some(config), Some(db));
        assert_eq!(state.bind_startup_tenant().as_deref(), Some("golden-dragon"));
    }

    #[test]
    fn test_unresolved_tenant_maps_to_deferred() {
        let state = AppState::from_parts(None, Some(test_db()));
        assert_eq!(state.bind_startup_tenant(), None);

        let err = state
            .with_db(|db, ctx| prep::list_prep_items(db, ctx))
            .unwrap_err();
        assert_eq!(err.error_type, ErrorType::Deferred);
        assert!(err.can_retry);
    }

    #[test]
    fn test_missing_database_is_fatal() {
        let state = AppState::from_parts(None, None);
        let err = state.with_db(|_, _| Ok(())).unwrap_err();
        assert_eq!(err.error_type, ErrorType::Fatal);
    }
}
