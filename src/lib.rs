//! ChefFlow: kitchen operations for many restaurants in one store.
//!
//! Every record lives under `restaurants/<tenantId>/...`. The current tenant
//! is carried by a [`TenantContext`] passed to each service call, and a call
//! made before the tenant is resolved fails with
//! [`ScopeError::MissingTenantScope`] instead of reaching shared data.

pub mod context;
pub mod day_buckets;
pub mod db;
pub mod error;
mod migrations;
pub mod paths;
pub mod services;
pub mod state;
pub mod tenant;
pub mod types;

pub use context::TenantContext;
pub use day_buckets::{group_by_day, group_by_day_at, DayBuckets, Timestamped};
pub use error::{CommandError, ErrorType, ScopeError, ServiceError};
pub use tenant::{display_name, normalize_tenant_name};
