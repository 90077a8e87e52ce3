//! # Procurement Desk
//!
//! Backend for a kitchen procurement request tracker. Staff submit requests
//! for ingredients, equipment and supplies, optionally with a photo; buyers
//! move them through approval, ordering and receipt with a six-step
//! checklist.
//!
//! ## Features
//!
//! - **REST API**: create, list (filter + search), fetch, patch and delete requests
//! - **Typed records**: closed enums for category, priority and status
//! - **Pluggable storage**: in-memory or MongoDB behind one `RequestStore` trait
//! - **Photo attachments**: local directory or Cloudinary behind `ImageStore`
//! - **Explicit configuration**: YAML and environment, no globals
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use procurement::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let store = procurement::storage::open(&config.database).await?;
//!
//!     ServerBuilder::new()
//!         .with_config(config)
//!         .with_store_arc(store)
//!         .serve()
//!         .await
//! }
//! ```

pub mod attachments;
pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{EntityError, ProcurementError, StorageError, ValidationError},
        query::{ListParams, RequestFilter},
        service::RequestStore,
    };

    // === Entities ===
    pub use crate::entities::{
        Category, Checklist, ChecklistPatch, NewRequest, Priority, ProcurementRequest,
        RequestPatch, Status,
    };

    // === Attachments ===
    pub use crate::attachments::{AttachmentError, ImageStore, ImageUpload, LocalImageStore};

    // === Storage ===
    pub use crate::storage::InMemoryRequestStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoRequestStore;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{RestExposure, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}
