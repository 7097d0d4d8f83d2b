//! Tenant-scoped operations behind each kitchen screen.
//!
//! Every function takes the store and the current [`TenantContext`]. When the
//! tenant is not resolved yet they fail with `MissingTenantScope` before
//! touching the store.

use crate::db::{DocumentDb, Order};
use crate::error::ServiceError;
use crate::paths::CollectionRef;
use crate::types::{decode_all, DocumentRecord};

pub mod cleaning;
pub mod downloads;
pub mod handovers;
pub mod inventory;
pub mod invoices;
pub mod migration;
pub mod orders;
pub mod prep;
pub mod recipes;
pub mod temperature;
pub mod tenants;

/// Trim user input and reject blanks.
pub(crate) fn require_text(value: &str, what: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{what} is required")));
    }
    Ok(trimmed.to_string())
}

/// All records in a collection, newest first.
pub(crate) fn list_newest<T: DocumentRecord>(
    db: &DocumentDb,
    coll: &CollectionRef,
) -> Result<Vec<T>, ServiceError> {
    let docs = db.list_ordered(coll, Order::NewestFirst)?;
    Ok(decode_all(docs))
}
