//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::InMemoryRequestStore;
#[cfg(feature = "mongodb_backend")]
pub use mongodb::MongoRequestStore;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::core::error::Result;
use crate::core::service::RequestStore;
use std::sync::Arc;

/// Open the record store selected by `config`
///
/// MongoDB stores are connected and indexed before being returned.
pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn RequestStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; records are lost on restart");
            Ok(Arc::new(InMemoryRequestStore::new()))
        }
        #[cfg(feature = "mongodb_backend")]
        StoreBackend::Mongodb => {
            let store = MongoRequestStore::connect(&config.uri, &config.name).await?;
            store.ensure_indexes().await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb_backend"))]
        StoreBackend::Mongodb => Err(crate::core::error::ConfigError::InvalidValue {
            field: "database.backend".to_string(),
            value: "mongodb".to_string(),
            message: "built without the `mongodb_backend` feature".to_string(),
        }
        .into()),
    }
}
