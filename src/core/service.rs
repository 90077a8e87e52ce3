//! Service trait for the request record store

use crate::core::error::Result;
use crate::core::query::RequestFilter;
use crate::entities::{NewRequest, ProcurementRequest, RequestPatch};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistent collection of procurement requests
///
/// Implementations provide CRUD operations; the handlers are agnostic to the
/// underlying storage. Validation rules live on the entity types
/// ([`NewRequest::into_record`], [`ProcurementRequest::apply_patch`]) so every
/// backend enforces the same invariants.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Validate, stamp and persist a new request
    async fn create(&self, request: NewRequest) -> Result<ProcurementRequest>;

    /// Fetch a request, or `EntityError::NotFound`
    async fn get(&self, id: &Uuid) -> Result<ProcurementRequest>;

    /// All requests matching `filter`, newest first
    async fn list(&self, filter: &RequestFilter) -> Result<Vec<ProcurementRequest>>;

    /// Merge `patch` into an existing request and return the new state
    async fn update(&self, id: &Uuid, patch: RequestPatch) -> Result<ProcurementRequest>;

    /// Remove a request and return what was removed
    async fn delete(&self, id: &Uuid) -> Result<ProcurementRequest>;

    /// Whether the backend is reachable
    async fn ping(&self) -> bool {
        true
    }

    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;
}
