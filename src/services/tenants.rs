// Tenant registry and user-to-tenant assignment.
//
// These calls work across tenants, so they take tenant ids directly instead
// of reading them from a context.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::context::TenantContext;
use crate::db::DocumentDb;
use crate::error::{ScopeError, ServiceError};
use crate::paths::collections::USERS;
use crate::paths::{self, CollectionRef, DocumentRef, TENANTS_ROOT};
use crate::tenant;
use crate::types::{decode_fixed, UserProfile};

use super::require_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub id: String,
    pub display_name: String,
}

fn user_doc(user_id: &str) -> Result<DocumentRef, ServiceError> {
    let user_id = require_text(user_id, "User id")?;
    Ok(CollectionRef::unscoped(USERS).doc(&user_id))
}

/// Create the tenant document for a restaurant name and return its id.
/// Registering an existing tenant leaves its document untouched.
pub fn register_tenant(db: &DocumentDb, name: &str) -> Result<String, ServiceError> {
    let name = require_text(name, "Restaurant name")?;
    let tenant_id = tenant::normalize_tenant_name(&name);
    let doc = paths::tenant_ref(&tenant_id)?;
    if db.get_document(&doc)?.is_some() {
        log::debug!("Restaurant {} already registered", tenant_id);
        return Ok(tenant_id);
    }
    db.set_document(
        &doc,
        json!({
            "displayName": name,
            "createdAt": crate::db::format_timestamp(&chrono::Utc::now()),
        }),
    )?;
    log::info!("Registered restaurant {} ({})", name, tenant_id);
    Ok(tenant_id)
}

/// A tenant exists if its document was written or anything is stored under
/// its namespace. Data migrated from the flat layout never gets a document.
pub fn tenant_exists(db: &DocumentDb, tenant_id: &str) -> Result<bool, ServiceError> {
    let doc = paths::tenant_ref(tenant_id)?;
    Ok(db.get_document(&doc)?.is_some() || db.has_descendants(&doc)?)
}

/// Stored display name, falling back to the derived one.
pub fn tenant_display_name(db: &DocumentDb, tenant_id: &str) -> Result<String, ServiceError> {
    let doc = paths::tenant_ref(tenant_id)?;
    let stored = db
        .get_document(&doc)?
        .and_then(|d| d.data.get("displayName").and_then(Value::as_str).map(str::to_string))
        .filter(|name| !name.trim().is_empty());
    Ok(stored.unwrap_or_else(|| tenant::display_name(tenant_id)))
}

/// Every tenant with a document or data, sorted by id.
pub fn list_tenants(db: &DocumentDb) -> Result<Vec<TenantSummary>, ServiceError> {
    let ids = db.child_ids(&CollectionRef::unscoped(TENANTS_ROOT))?;
    ids.into_iter()
        .map(|id| -> Result<TenantSummary, ServiceError> {
            Ok(TenantSummary {
                display_name: tenant_display_name(db, &id)?,
                id,
            })
        })
        .collect()
}

/// Point a user's profile at `tenant_id`, keeping the profile's other fields.
pub fn assign_user_tenant(
    db: &DocumentDb,
    user_id: &str,
    tenant_id: &str,
) -> Result<(), ServiceError> {
    if !tenant::is_valid_tenant_id(tenant_id) {
        return Err(ScopeError::InvalidTenantId(tenant_id.to_string()).into());
    }
    let doc = user_doc(user_id)?;
    let mut fields = match db.get_document(&doc)?.map(|d| d.data) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    fields.insert("restaurantId".to_string(), Value::String(tenant_id.to_string()));
    db.set_document(&doc, Value::Object(fields))?;
    Ok(())
}

/// Bind `ctx` to the tenant of `user_id`.
///
/// The context is cleared when the user has no profile, no `restaurantId`,
/// or points at a tenant that does not exist. It is also cleared when the
/// lookup itself fails, so a failed sign-in never keeps the previous tenant.
/// Returns the bound tenant.
pub fn resolve_tenant_for_user(
    db: &DocumentDb,
    ctx: &TenantContext,
    user_id: &str,
) -> Result<Option<String>, ServiceError> {
    let resolved = match lookup_user_tenant(db, user_id) {
        Ok(resolved) => resolved,
        Err(e) => {
            log::warn!("Restaurant lookup failed for {}: {}", user_id, e);
            ctx.switch_tenant(None)?;
            return Err(e);
        }
    };
    ctx.switch_tenant(resolved.as_deref())?;
    Ok(resolved)
}

fn lookup_user_tenant(db: &DocumentDb, user_id: &str) -> Result<Option<String>, ServiceError> {
    let doc = user_doc(user_id)?;
    let profile: UserProfile = decode_fixed(db.get_document(&doc)?)?;
    let candidate = profile
        .restaurant_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    Ok(match candidate {
        Some(id) if tenant::is_valid_tenant_id(&id) && tenant_exists(db, &id)? => Some(id),
        Some(id) => {
            log::warn!("User {} points at unknown restaurant {}", user_id, id);
            None
        }
        None => {
            log::warn!("No restaurant assigned to user {}", user_id);
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::services::prep;

    #[test]
    fn test_register_normalizes_and_keeps_existing() {
        let db = test_db();
        let id = register_tenant(&db, "Harbour Fish Bar").unwrap();
        assert_eq!(id, "harbour-fish-bar");
        assert!(tenant_exists(&db, &id).unwrap());
        assert_eq!(tenant_display_name(&db, &id).unwrap(), "Harbour Fish Bar");

        // Same normalized id, original display name kept
        assert_eq!(register_tenant(&db, "harbour  fish bar!").unwrap(), id);
        assert_eq!(tenant_display_name(&db, &id).unwrap(), "Harbour Fish Bar");

        assert!(matches!(register_tenant(&db, "  "), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_exists_via_data_only() {
        let db = test_db();
        assert!(!tenant_exists(&db, "joes-cafe").unwrap());
        let ctx = TenantContext::for_tenant("joes-cafe").unwrap();
        prep::add_prep_item(&db, &ctx, "Slice bread", None).unwrap();
        assert!(tenant_exists(&db, "joes-cafe").unwrap());

        register_tenant(&db, "Downtown Bistro").unwrap();
        let tenants = list_tenants(&db).unwrap();
        assert_eq!(
            tenants,
            vec![
                TenantSummary { id: "downtown-bistro".into(), display_name: "Downtown Bistro".into() },
                TenantSummary { id: "joes-cafe".into(), display_name: "Joe's Cafe".into() },
            ]
        );
    }

    #[test]
    fn test_resolve_user_tenant() {
        let db = test_db();
        let ctx = TenantContext::new();
        assert_eq!(resolve_tenant_for_user(&db, &ctx, "uid-1").unwrap(), None);
        assert!(!ctx.is_resolved());

        // Assigned but the tenant has no data yet
        assign_user_tenant(&db, "uid-1", "golden-dragon").unwrap();
        assert_eq!(resolve_tenant_for_user(&db, &ctx, "uid-1").unwrap(), None);

        register_tenant(&db, "Golden Dragon").unwrap();
        assert_eq!(
            resolve_tenant_for_user(&db, &ctx, "uid-1").unwrap().as_deref(),
            Some("golden-dragon")
        );
        assert_eq!(ctx.tenant_id().as_deref(), Some("golden-dragon"));
    }

    #[test]
    fn test_failed_resolution_clears_previous_tenant() {
        let db = test_db();
        let ctx = TenantContext::for_tenant("joes-cafe").unwrap();
        db.set_document(&user_doc("uid-3").unwrap(), json!({"restaurantId": 42}))
            .unwrap();

        let err = resolve_tenant_for_user(&db, &ctx, "uid-3").unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));
        assert!(!ctx.is_resolved());

        // Blank user ids fail validation and also clear the context
        ctx.switch_tenant(Some("joes-cafe")).unwrap();
        assert!(matches!(
            resolve_tenant_for_user(&db, &ctx, " "),
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(ctx.tenant_id(), None);
    }

    #[test]
    fn test_assign_keeps_profile_fields() {
        let db = test_db();
        let doc = user_doc("uid-2").unwrap();
        db.set_document(&doc, json!({"fullName": "Sam Cook"})).unwrap();
        assign_user_tenant(&db, "uid-2", "burger-palace").unwrap();

        let profile: UserProfile = decode_fixed(db.get_document(&doc).unwrap()).unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Sam Cook"));
        assert_eq!(profile.restaurant_id.as_deref(), Some("burger-palace"));

        assert!(matches!(
            assign_user_tenant(&db, "uid-2", "a/b"),
            Err(ServiceError::Scope(ScopeError::InvalidTenantId(_)))
        ));
    }
}
