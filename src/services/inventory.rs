// Supplier and fridge name lists, plus the starter data for a new tenant.

use serde_json::json;

use crate::context::TenantContext;
use crate::db::{format_timestamp, DocumentDb};
use crate::error::ServiceError;
use crate::paths::collections::{FRIDGES, SUPPLIERS};
use crate::paths::DocumentRef;
use crate::types::{decode_fixed, NamedList};

use super::require_text;

pub const DEFAULT_SUPPLIERS: &[&str] = &[
    "Fresh Foods Co.",
    "Prime Meat Supply",
    "Ocean Fresh Seafood",
    "Garden Vegetables Ltd",
    "Daily Dairy Products",
    "Global Spices Inc",
    "Baker's Best Bakery",
    "Beverage Distributors",
    "Restaurant Supply Co.",
    "Chef's Choice Imports",
];

pub const DEFAULT_FRIDGES: &[&str] = &["Walk-in Fridge", "Prep Fridge", "Dessert Fridge", "Beverage Cooler"];

/// Counts of names written by [`seed_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub suppliers: usize,
    pub fridges: usize,
}

// Both lists live in a single document named after their collection.
fn list_doc(ctx: &TenantContext, collection: &str) -> Result<DocumentRef, ServiceError> {
    Ok(ctx.document(collection, collection)?)
}

fn read_list(db: &DocumentDb, doc: &DocumentRef) -> Result<Vec<String>, ServiceError> {
    let list: NamedList = decode_fixed(db.get_document(doc)?)?;
    Ok(list.array)
}

fn write_list(db: &DocumentDb, doc: &DocumentRef, names: &[String]) -> Result<(), ServiceError> {
    let now = format_timestamp(&chrono::Utc::now());
    let created_at = db
        .get_document(doc)?
        .and_then(|d| d.data.get("createdAt").cloned())
        .unwrap_or_else(|| json!(now));
    db.set_document(
        doc,
        json!({ "array": names, "createdAt": created_at, "updatedAt": now }),
    )?;
    Ok(())
}

fn add_name(db: &DocumentDb, doc: &DocumentRef, name: &str, what: &str) -> Result<bool, ServiceError> {
    let name = require_text(name, what)?;
    let mut names = read_list(db, doc)?;
    if names.contains(&name) {
        return Ok(false);
    }
    names.push(name);
    write_list(db, doc, &names)?;
    Ok(true)
}

/// Write `defaults` unless the list already has entries.
fn seed_list(db: &DocumentDb, doc: &DocumentRef, defaults: &[&str]) -> Result<usize, ServiceError> {
    if !read_list(db, doc)?.is_empty() {
        log::debug!("{} already populated, not seeding", doc);
        return Ok(0);
    }
    let names: Vec<String> = defaults.iter().map(|s| s.to_string()).collect();
    write_list(db, doc, &names)?;
    Ok(names.len())
}

pub fn list_suppliers(db: &DocumentDb, ctx: &TenantContext) -> Result<Vec<String>, ServiceError> {
    read_list(db, &list_doc(ctx, SUPPLIERS)?)
}

/// Returns false if the supplier was already listed.
pub fn add_supplier(db: &DocumentDb, ctx: &TenantContext, name: &str) -> Result<bool, ServiceError> {
    add_name(db, &list_doc(ctx, SUPPLIERS)?, name, "Supplier name")
}

pub fn list_fridges(db: &DocumentDb, ctx: &TenantContext) -> Result<Vec<String>, ServiceError> {
    read_list(db, &list_doc(ctx, FRIDGES)?)
}

pub fn add_fridge(db: &DocumentDb, ctx: &TenantContext, name: &str) -> Result<bool, ServiceError> {
    add_name(db, &list_doc(ctx, FRIDGES)?, name, "Fridge name")
}

pub fn seed_suppliers(db: &DocumentDb, ctx: &TenantContext) -> Result<usize, ServiceError> {
    seed_list(db, &list_doc(ctx, SUPPLIERS)?, DEFAULT_SUPPLIERS)
}

pub fn seed_fridges(db: &DocumentDb, ctx: &TenantContext) -> Result<usize, ServiceError> {
    seed_list(db, &list_doc(ctx, FRIDGES)?, DEFAULT_FRIDGES)
}

/// Seed both lists for the current tenant. Lists that already have entries
/// are left alone.
pub fn seed_all(db: &DocumentDb, ctx: &TenantContext) -> Result<SeedReport, ServiceError> {
    let tenant_id = ctx.require()?;
    let report = SeedReport {
        suppliers: seed_suppliers(db, ctx)?,
        fridges: seed_fridges(db, ctx)?,
    };
    log::info!(
        "Seeded {}: {} suppliers, {} fridges",
        tenant_id,
        report.suppliers,
        report.fridges
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[test]
    fn test_seed_is_idempotent() {
        let db = test_db();
        let ctx = TenantContext::for_tenant("t").unwrap();
        let first = seed_all(&db, &ctx).unwrap();
        assert_eq!(first, SeedReport { suppliers: 10, fridges: 4 });
        assert_eq!(seed_all(&db, &ctx).unwrap(), SeedReport::default());

        assert_eq!(list_suppliers(&db, &ctx).unwrap().len(), 10);
        assert_eq!(list_fridges(&db, &ctx).unwrap()[0], "Walk-in Fridge");
    }

    #[test]
    fn test_add_names() {
        let db = test_db();
        let ctx = TenantContext::for_tenant("t").unwrap();
        assert!(add_supplier(&db, &ctx, " Local Farm ").unwrap());
        assert!(!add_supplier(&db, &ctx, "Local Farm").unwrap());
        assert!(add_fridge(&db, &ctx, "Bar Fridge").unwrap());
        assert_eq!(list_suppliers(&db, &ctx).unwrap(), vec!["Local Farm"]);
        assert_eq!(list_fridges(&db, &ctx).unwrap(), vec!["Bar Fridge"]);

        // Seeding skips lists that already have entries
        assert_eq!(seed_suppliers(&db, &ctx).unwrap(), 0);
    }

    #[test]
    fn test_list_documents_live_under_tenant() {
        let ctx = TenantContext::for_tenant("t").unwrap();
        assert_eq!(list_doc(&ctx, SUPPLIERS).unwrap().path(), "restaurants/t/suppliers/suppliers");
    }
}
