//! The current tenant, passed explicitly to every data-access call.
//!
//! There is exactly one way to change the tenant: [`TenantContext::switch_tenant`].
//! Everything else reads it.

use parking_lot::RwLock;

use crate::error::ScopeError;
use crate::paths::{self, CollectionRef, DocumentRef};
use crate::tenant;

#[derive(Debug, Default)]
pub struct TenantContext {
    tenant_id: RwLock<Option<String>>,
}

impl TenantContext {
    /// A context whose tenant is not resolved yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context already bound to `tenant_id`.
    pub fn for_tenant(tenant_id: &str) -> Result<Self, ScopeError> {
        let ctx = Self::new();
        ctx.switch_tenant(Some(tenant_id))?;
        Ok(ctx)
    }

    /// Bind the context to another tenant, or clear it with `None` (sign-out).
    pub fn switch_tenant(&self, tenant_id: Option<&str>) -> Result<(), ScopeError> {
        if let Some(id) = tenant_id {
            if !tenant::is_valid_tenant_id(id) {
                return Err(ScopeError::InvalidTenantId(id.to_string()));
            }
        }

        let mut guard = self.tenant_id.write();
        let previous = guard.take();
        *guard = tenant_id.map(str::to_string);
        match (&previous, tenant_id) {
            (Some(old), Some(new)) if old != new => {
                log::info!("Switched restaurant: {} -> {}", old, new)
            }
            (None, Some(new)) => log::info!("Restaurant resolved: {}", new),
            (Some(old), None) => log::info!("Restaurant cleared (was {})", old),
            _ => {}
        }
        Ok(())
    }

    /// Current tenant id, if resolved.
    pub fn tenant_id(&self) -> Option<String> {
        self.tenant_id.read().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.tenant_id.read().is_some()
    }

    /// Current tenant id or `MissingTenantScope`.
    pub fn require(&self) -> Result<String, ScopeError> {
        self.tenant_id().ok_or(ScopeError::MissingTenantScope)
    }

    /// Display name of the current tenant.
    pub fn display_name(&self) -> Option<String> {
        self.tenant_id
            .read()
            .as_deref()
            .map(tenant::display_name)
    }

    fn with_tenant<T>(
        &self,
        f: impl FnOnce(&str) -> Result<T, ScopeError>,
    ) -> Result<T, ScopeError> {
        let guard = self.tenant_id.read();
        f(guard.as_deref().unwrap_or(""))
    }

    pub fn tenant_doc(&self) -> Result<DocumentRef, ScopeError> {
        self.with_tenant(paths::tenant_ref)
    }

    pub fn collection(&self, collection: &str) -> Result<CollectionRef, ScopeError> {
        self.with_tenant(|t| paths::collection_ref(t, collection))
    }

    pub fn document(&self, collection: &str, doc_id: &str) -> Result<DocumentRef, ScopeError> {
        self.with_tenant(|t| paths::document_ref(t, collection, doc_id))
    }

    pub fn sub_collection(
        &self,
        collection: &str,
        doc_id: &str,
        sub_collection: &str,
    ) -> Result<CollectionRef, ScopeError> {
        self.with_tenant(|t| paths::sub_collection_ref(t, collection, doc_id, sub_collection))
    }

    pub fn sub_document(
        &self,
        collection: &str,
        doc_id: &str,
        sub_collection: &str,
        sub_doc_id: &str,
    ) -> Result<DocumentRef, ScopeError> {
        self.with_tenant(|t| {
            paths::sub_document_ref(t, collection, doc_id, sub_collection, sub_doc_id)
        })
    }

    pub fn nested_collection(&self, segments: &[&str]) -> Result<CollectionRef, ScopeError> {
        self.with_tenant(|t| paths::nested_collection_ref(t, segments))
    }

    pub fn nested_document(&self, segments: &[&str]) -> Result<DocumentRef, ScopeError> {
        self.with_tenant(|t| paths::nested_document_ref(t, segments))
    }
}
