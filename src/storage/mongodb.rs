//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag (enabled
//! by default).
//!
//! # Storage model
//!
//! All requests live in the `procurementrequests` collection. Records are
//! serialized via `serde_json::Value` as an intermediate format, then
//! converted to BSON documents: the UUID is stored as a string under `_id`
//! and timestamps as fixed-width RFC 3339 strings, which keeps
//! `sort({createdAt: -1})` chronological.

use crate::core::error::{ProcurementError, Result, StorageError};
use crate::core::query::RequestFilter;
use crate::core::service::RequestStore;
use crate::entities::{NewRequest, ProcurementRequest, RequestPatch};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Database, IndexModel};
use uuid::Uuid;

/// Collection holding the request documents
pub const COLLECTION: &str = "procurementrequests";

const BACKEND: &str = "MongoDB";

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON Document,
/// renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: serde_json::Value) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json).map_err(|e| StorageError::SerializationError {
        message: format!("failed to convert JSON to BSON: {}", e),
    })?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => {
            return Err(StorageError::SerializationError {
                message: "expected BSON document, got non-object".to_string(),
            }
            .into());
        }
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value,
/// renaming `_id` → `id` for the domain convention.
fn document_to_json(mut doc: Document) -> serde_json::Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

fn query_error(operation: &str, e: mongodb::error::Error) -> ProcurementError {
    StorageError::QueryError {
        backend: BACKEND.to_string(),
        message: format!("{}: {}", operation, e),
    }
    .into()
}

/// Translate a list filter into a MongoDB query document
///
/// The search term is escaped so it matches literally, case-insensitively.
pub fn filter_document(filter: &RequestFilter) -> Document {
    let mut query = Document::new();

    if let Some(status) = filter.status {
        query.insert("status", status.as_str());
    }
    if let Some(priority) = filter.priority {
        query.insert("priority", priority.as_str());
    }
    if let Some(category) = filter.category {
        query.insert("category", category.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = regex::escape(search);
        let alternatives: Vec<Bson> = crate::core::query::SEARCH_FIELDS
            .iter()
            .map(|field| Bson::Document(doc! { *field: { "$regex": pattern.as_str(), "$options": "i" } }))
            .collect();
        query.insert("$or", alternatives);
    }

    query
}

// ---------------------------------------------------------------------------
// MongoRequestStore
// ---------------------------------------------------------------------------

/// Request store backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use procurement::storage::MongoRequestStore;
///
/// let store = MongoRequestStore::connect("mongodb://localhost:27017/procurementapp", "procurementapp").await?;
/// store.ensure_indexes().await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoRequestStore {
    database: Database,
}

impl MongoRequestStore {
    /// Create a store on an existing database handle
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Connect to `uri`
    ///
    /// Uses the database named in the URI path, or `default_database` when
    /// the URI has none.
    pub async fn connect(uri: &str, default_database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StorageError::ConnectionError {
                backend: BACKEND.to_string(),
                message: e.to_string(),
            })?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(default_database));

        tracing::info!(database = %database.name(), "connected to MongoDB");
        Ok(Self::new(database))
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(COLLECTION)
    }

    /// Create the indexes used by `list`
    ///
    /// Idempotent; called on every startup.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let indexes = vec![
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
            IndexModel::builder().keys(doc! { "status": 1 }).build(),
            IndexModel::builder().keys(doc! { "priority": 1 }).build(),
            IndexModel::builder().keys(doc! { "category": 1 }).build(),
        ];

        self.collection()
            .create_indexes(indexes)
            .await
            .map_err(|e| query_error("create indexes", e))?;

        Ok(())
    }

    fn record_to_document(record: &ProcurementRequest) -> Result<Document> {
        let json = serde_json::to_value(record).map_err(|e| StorageError::SerializationError {
            message: format!("failed to serialize request: {}", e),
        })?;
        json_to_document(json)
    }

    fn document_to_record(doc: Document) -> Result<ProcurementRequest> {
        let json = document_to_json(doc);
        serde_json::from_value(json).map_err(|e| {
            StorageError::SerializationError {
                message: format!("failed to deserialize request from document: {}", e),
            }
            .into()
        })
    }

    async fn find(&self, id: &Uuid) -> Result<Option<ProcurementRequest>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| query_error("get request", e))?;

        doc.map(Self::document_to_record).transpose()
    }
}

#[async_trait]
impl RequestStore for MongoRequestStore {
    async fn create(&self, request: NewRequest) -> Result<ProcurementRequest> {
        let record = request.into_record()?;
        let doc = Self::record_to_document(&record)?;

        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| query_error("create request", e))?;

        Ok(record)
    }

    async fn get(&self, id: &Uuid) -> Result<ProcurementRequest> {
        self.find(id)
            .await?
            .ok_or_else(|| ProcurementError::not_found(*id))
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<ProcurementRequest>> {
        let cursor = self
            .collection()
            .find(filter_document(filter))
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(|e| query_error("list requests", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| query_error("collect requests", e))?;

        docs.into_iter().map(Self::document_to_record).collect()
    }

    /// Read, merge in memory, then replace the stored document.
    ///
    /// Concurrent updates of the same record are last-writer-wins.
    async fn update(&self, id: &Uuid, patch: RequestPatch) -> Result<ProcurementRequest> {
        let mut record = self
            .find(id)
            .await?
            .ok_or_else(|| ProcurementError::not_found(*id))?;

        record.apply_patch(patch)?;
        let doc = Self::record_to_document(&record)?;

        let result = self
            .collection()
            .replace_one(doc! { "_id": uuid_bson(id) }, doc)
            .await
            .map_err(|e| query_error("update request", e))?;

        if result.matched_count == 0 {
            return Err(ProcurementError::not_found(*id));
        }

        Ok(record)
    }

    async fn delete(&self, id: &Uuid) -> Result<ProcurementRequest> {
        let removed = self
            .collection()
            .find_one_and_delete(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| query_error("delete request", e))?
            .ok_or_else(|| ProcurementError::not_found(*id))?;

        Self::document_to_record(removed)
    }

    async fn ping(&self) -> bool {
        self.database.run_command(doc! { "ping": 1 }).await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
