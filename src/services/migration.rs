// Move data from the flat single-restaurant layout into a tenant namespace.
//
// Legacy layout:
//   <collection>/<id>                              flat collections
//   recipes/categories {names}                     category list
//   recipes/categories/<category>/<id>             recipes
//   fridge/fridges/<fridge name>/<id>              fridge readings
//   downloads/invoices/recent_downloads/<id>       invoice download history
//
// Each lands at the same relative path under `restaurants/<tenantId>/`.

use serde::Serialize;

use crate::db::{DbError, DocumentDb};
use crate::error::ServiceError;
use crate::paths::collections::{
    CLEANING_LIST, DELIVERY_LOGS, DOWNLOADS, INVOICES, ORDER_LIST, PREP_LIST, RECENT_DOWNLOADS,
    RECIPES, RECIPE_CATEGORIES_DOC, SUPPLIERS,
};
use crate::paths::{self, CollectionRef};
use crate::tenant;
use crate::types::{decode_fixed, RecipeCategories};

use super::recipes::is_usable_category;
use super::require_text;

/// Flat collections copied one-to-one.
pub const LEGACY_COLLECTIONS: &[&str] = &[
    CLEANING_LIST,
    DELIVERY_LOGS,
    INVOICES,
    ORDER_LIST,
    PREP_LIST,
    SUPPLIERS,
];

/// Legacy parent of per-fridge reading collections: `fridge/fridges`.
const LEGACY_FRIDGE_ROOT: (&str, &str) = ("fridge", "fridges");

/// Fridges that had reading collections in the flat layout.
const LEGACY_FRIDGES: &[&str] = &["walk-in fridge", "prep fridge"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub tenant_id: String,
    /// Documents copied per flat collection, in [`LEGACY_COLLECTIONS`] order.
    pub collections: Vec<(String, usize)>,
    pub recipe_categories: usize,
    pub recipes: usize,
    pub fridge_readings: usize,
    pub downloads: usize,
}

impl MigrationReport {
    pub fn total(&self) -> usize {
        self.collections.iter().map(|(_, n)| n).sum::<usize>()
            + self.recipes
            + self.fridge_readings
            + self.downloads
            + usize::from(self.recipe_categories > 0)
    }
}

/// Build `<root>/<a>/<b>/...` outside any tenant.
fn legacy_collection(segments: &[&str]) -> CollectionRef {
    CollectionRef::from_segments(segments.iter().map(|s| s.to_string()).collect())
}

/// Copy every document of `from` into `to`, keeping ids and data.
fn copy_collection(
    db: &DocumentDb,
    from: &CollectionRef,
    to: &CollectionRef,
) -> Result<usize, DbError> {
    let docs = db.list_documents(from)?;
    for doc in &docs {
        db.set_document(&to.doc(&doc.id), doc.data.clone())?;
    }
    if !docs.is_empty() {
        log::debug!("Copied {} documents {} -> {}", docs.len(), from, to);
    }
    Ok(docs.len())
}

/// Copy all legacy data into the namespace of `restaurant_name`.
///
/// Runs in one transaction: either everything is copied or nothing is.
/// Existing documents with the same id in the target are overwritten, so
/// running it twice is harmless. The legacy data is left in place; see
/// [`cleanup_legacy_collections`].
pub fn migrate_to_tenant(db: &DocumentDb, restaurant_name: &str) -> Result<MigrationReport, ServiceError> {
    let restaurant_name = require_text(restaurant_name, "Restaurant name")?;
    let tenant_id = tenant::normalize_tenant_name(&restaurant_name);
    let tenant_doc = paths::tenant_ref(&tenant_id)?;
    log::info!(
        "Starting migration to restaurant \"{}\" (ID: {})",
        restaurant_name,
        tenant_id
    );

    let report = db.with_transaction(|db| {
        let mut report = MigrationReport {
            tenant_id: tenant_id.clone(),
            ..Default::default()
        };

        for &name in LEGACY_COLLECTIONS {
            let n = copy_collection(db, &legacy_collection(&[name]), &tenant_doc.collection(name))?;
            report.collections.push((name.to_string(), n));
        }

        let legacy_categories = legacy_collection(&[RECIPES]).doc(RECIPE_CATEGORIES_DOC);
        let categories_doc = db.get_document(&legacy_categories)?;
        if let Some(doc) = &categories_doc {
            let target = tenant_doc.collection(RECIPES).doc(RECIPE_CATEGORIES_DOC);
            db.set_document(&target, doc.data.clone())?;
        }
        let categories: RecipeCategories = decode_fixed(categories_doc)?;
        report.recipe_categories = categories.names.len();
        for category in &categories.names {
            if !is_usable_category(category) {
                log::warn!("Skipping recipe category with unusable name {:?}", category);
                continue;
            }
            report.recipes += copy_collection(
                db,
                &legacy_categories.collection(category),
                &tenant_doc
                    .collection(RECIPES)
                    .doc(RECIPE_CATEGORIES_DOC)
                    .collection(category),
            )?;
        }

        let (fridge_root, fridge_doc) = LEGACY_FRIDGE_ROOT;
        for &fridge in LEGACY_FRIDGES {
            report.fridge_readings += copy_collection(
                db,
                &legacy_collection(&[fridge_root, fridge_doc, fridge]),
                &tenant_doc
                    .collection(fridge_root)
                    .doc(fridge_doc)
                    .collection(fridge),
            )?;
        }

        report.downloads = copy_collection(
            db,
            &legacy_collection(&[DOWNLOADS, "invoices", RECENT_DOWNLOADS]),
            &tenant_doc
                .collection(DOWNLOADS)
                .doc("invoices")
                .collection(RECENT_DOWNLOADS),
        )?;

        Ok(report)
    })?;

    log::info!(
        "Migration completed for {}: {} documents",
        report.tenant_id,
        report.total()
    );
    Ok(report)
}

/// Delete the legacy flat collections and the legacy recipe, fridge and
/// download trees. Returns how many documents were removed.
pub fn cleanup_legacy_collections(db: &DocumentDb) -> Result<usize, ServiceError> {
    let removed = db.with_transaction(|db| {
        let mut removed = 0;
        for name in LEGACY_COLLECTIONS
            .iter()
            .copied()
            .chain([RECIPES, LEGACY_FRIDGE_ROOT.0, DOWNLOADS])
        {
            let n = db.delete_tree(&legacy_collection(&[name]))?;
            if n > 0 {
                log::info!("Deleted old {} collection ({} documents)", name, n);
            }
            removed += n;
        }
        Ok(removed)
    })?;
    Ok(removed)
}
