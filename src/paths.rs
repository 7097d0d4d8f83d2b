//! Tenant-scoped storage references.
//!
//! Every reference produced here lives under `restaurants/<tenantId>/...`.
//! Resolution fails with [`ScopeError::MissingTenantScope`] when the tenant id
//! is empty so no caller can ever address an unscoped, shared location. Other
//! segments are passed through untouched; the store decides whether a path
//! is well formed.

use std::fmt;

use serde::Serialize;

use crate::error::ScopeError;

/// Root collection holding one document per tenant.
pub const TENANTS_ROOT: &str = "restaurants";

/// Collection and fixed document names used by the app.
pub mod collections {
    pub const PREP_LIST: &str = "preplist";
    pub const CLEANING_LIST: &str = "cleaninglist";
    pub const ORDER_LIST: &str = "orderlist";
    pub const FRIDGE_LOGS: &str = "fridgelogs";
    pub const DELIVERY_LOGS: &str = "deliverylogs";
    pub const HANDOVERS: &str = "handovers";
    pub const INVOICES: &str = "invoices";
    pub const SUPPLIERS: &str = "suppliers";
    pub const FRIDGES: &str = "fridges";
    pub const RECIPES: &str = "recipes";
    pub const DOWNLOADS: &str = "downloads";

    /// Document under `recipes` listing category names; also the parent of
    /// one sub-collection per category.
    pub const RECIPE_CATEGORIES_DOC: &str = "categories";
    /// Sub-collection holding download history under `downloads/<kind>`.
    pub const RECENT_DOWNLOADS: &str = "recent_downloads";
    /// Top-level collection of user profiles (not tenant scoped).
    pub const USERS: &str = "users";
}

/// Reference to a collection: an odd number of path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CollectionRef {
    segments: Vec<String>,
}

/// Reference to one document: an even number of path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentRef {
    segments: Vec<String>,
}

impl CollectionRef {
    /// A top-level collection outside any tenant namespace. Only the user
    /// directory and legacy-data migration address these.
    pub(crate) fn unscoped(name: &str) -> Self {
        Self {
            segments: vec![name.to_string()],
        }
    }

    pub(crate) fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Slash-joined storage path.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Last segment: the collection name.
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The document this collection is nested under, if any.
    pub fn parent(&self) -> Option<DocumentRef> {
        if self.segments.len() < 3 {
            return None;
        }
        Some(DocumentRef {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Reference to a document inside this collection.
    pub fn doc(&self, id: &str) -> DocumentRef {
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        DocumentRef { segments }
    }
}

impl DocumentRef {
    pub(crate) fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Last segment: the document id.
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The collection containing this document.
    pub fn parent(&self) -> CollectionRef {
        CollectionRef {
            segments: self.segments[..self.segments.len().saturating_sub(1)].to_vec(),
        }
    }

    /// Reference to a sub-collection nested under this document.
    pub fn collection(&self, name: &str) -> CollectionRef {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        CollectionRef { segments }
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn scoped(tenant_id: &str, rest: &[&str]) -> Result<Vec<String>, ScopeError> {
    if tenant_id.trim().is_empty() {
        return Err(ScopeError::MissingTenantScope);
    }
    let mut segments = Vec::with_capacity(rest.len() + 2);
    segments.push(TENANTS_ROOT.to_string());
    segments.push(tenant_id.to_string());
    segments.extend(rest.iter().map(|s| s.to_string()));
    Ok(segments)
}

/// Document holding the tenant itself: `restaurants/<tenantId>`.
pub fn tenant_ref(tenant_id: &str) -> Result<DocumentRef, ScopeError> {
    scoped(tenant_id, &[]).map(DocumentRef::from_segments)
}

/// All records of `collection` belonging to `tenant_id`.
pub fn collection_ref(tenant_id: &str, collection: &str) -> Result<CollectionRef, ScopeError> {
    scoped(tenant_id, &[collection]).map(CollectionRef::from_segments)
}

/// One record of `collection` belonging to `tenant_id`.
pub fn document_ref(
    tenant_id: &str,
    collection: &str,
    doc_id: &str,
) -> Result<DocumentRef, ScopeError> {
    scoped(tenant_id, &[collection, doc_id]).map(DocumentRef::from_segments)
}

/// Collection nested under one parent document, e.g. recipes of one category.
pub fn sub_collection_ref(
    tenant_id: &str,
    collection: &str,
    doc_id: &str,
    sub_collection: &str,
) -> Result<CollectionRef, ScopeError> {
    scoped(tenant_id, &[collection, doc_id, sub_collection]).map(CollectionRef::from_segments)
}

/// One record inside a nested collection.
pub fn sub_document_ref(
    tenant_id: &str,
    collection: &str,
    doc_id: &str,
    sub_collection: &str,
    sub_doc_id: &str,
) -> Result<DocumentRef, ScopeError> {
    scoped(tenant_id, &[collection, doc_id, sub_collection, sub_doc_id])
        .map(DocumentRef::from_segments)
}

/// Arbitrary-depth collection reference below the tenant namespace.
pub fn nested_collection_ref(
    tenant_id: &str,
    segments: &[&str],
) -> Result<CollectionRef, ScopeError> {
    scoped(tenant_id, segments).map(CollectionRef::from_segments)
}

/// Arbitrary-depth document reference below the tenant namespace.
pub fn nested_document_ref(tenant_id: &str, segments: &[&str]) -> Result<DocumentRef, ScopeError> {
    scoped(tenant_id, segments).map(DocumentRef::from_segments)
}
