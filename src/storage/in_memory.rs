//! In-memory implementation of RequestStore for testing and development

use crate::core::error::{ProcurementError, Result, StorageError};
use crate::core::query::{RequestFilter, sort_newest_first};
use crate::core::service::RequestStore;
use crate::entities::{NewRequest, ProcurementRequest, RequestPatch};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory request store
///
/// Useful for testing and development. Uses RwLock for thread-safe access;
/// clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryRequestStore {
    requests: Arc<RwLock<HashMap<Uuid, ProcurementRequest>>>,
}

impl InMemoryRequestStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, ProcurementRequest>>> {
        self.requests
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, ProcurementRequest>>> {
        self.requests
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn create(&self, request: NewRequest) -> Result<ProcurementRequest> {
        let record = request.into_record()?;
        self.write()?.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: &Uuid) -> Result<ProcurementRequest> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| ProcurementError::not_found(*id))
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<ProcurementRequest>> {
        let mut matching: Vec<ProcurementRequest> = self
            .read()?
            .values()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }

    async fn update(&self, id: &Uuid, patch: RequestPatch) -> Result<ProcurementRequest> {
        let mut requests = self.write()?;
        let record = requests
            .get_mut(id)
            .ok_or_else(|| ProcurementError::not_found(*id))?;

        record.apply_patch(patch)?;
        Ok(record.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<ProcurementRequest> {
        self.write()?
            .remove(id)
            .ok_or_else(|| ProcurementError::not_found(*id))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
