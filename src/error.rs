//! Error types for tenant-scoped data access
//!
//! Errors are classified by how a calling screen should react:
//! - Deferred: the tenant is not resolved yet, skip the action or show a loading state
//! - Invalid: the user supplied something we refuse to store
//! - Retryable: the database was busy or locked
//! - Fatal: everything else

use thiserror::Error;

use crate::db::DbError;

/// Failure to scope a storage reference to a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// Raised by every path-resolution operation when the tenant id is empty.
    #[error("Restaurant ID is required")]
    MissingTenantScope,

    /// Raised by `TenantContext::switch_tenant` for ids that cannot be a path segment.
    #[error("Invalid restaurant ID: {0:?}")]
    InvalidTenantId(String),
}

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl ServiceError {
    /// Returns true if the caller should wait for tenant resolution and try later
    pub fn is_deferred(&self) -> bool {
        matches!(self, ServiceError::Scope(ScopeError::MissingTenantScope))
    }

    /// Returns true if retrying the same call can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _))) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    /// Get a user-facing recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ServiceError::Scope(ScopeError::MissingTenantScope) => {
                "Restaurant is still loading. Try again in a moment."
            }
            ServiceError::Scope(ScopeError::InvalidTenantId(_)) => {
                "Pick a restaurant from the list or check its name."
            }
            ServiceError::Validation(_) => "Check the entered values and try again.",
            ServiceError::Db(DbError::NotFound(_)) => {
                "The item was removed. Refresh the list."
            }
            ServiceError::Db(_) if self.is_retryable() => "The database is busy. Try again.",
            ServiceError::Db(_) => "Check ~/.chefflow/config.json and disk space.",
        }
    }
}

/// Serializable error representation for a UI layer
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Deferred,
    Invalid,
    Retryable,
    Fatal,
}

impl From<&ServiceError> for CommandError {
    fn from(err: &ServiceError) -> Self {
        let error_type = if err.is_deferred() {
            ErrorType::Deferred
        } else if err.is_retryable() {
            ErrorType::Retryable
        } else if matches!(
            err,
            ServiceError::Validation(_) | ServiceError::Scope(ScopeError::InvalidTenantId(_))
        ) {
            ErrorType::Invalid
        } else {
            ErrorType::Fatal
        };

        CommandError {
            message: err.to_string(),
            error_type,
            can_retry: err.is_deferred() || err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
