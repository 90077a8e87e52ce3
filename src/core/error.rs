//! Typed error handling for the procurement service
//!
//! Every failure a handler can produce is one of the variants below. Each
//! variant knows its HTTP status and a stable machine-readable code, so the
//! REST layer can turn any error into a JSON body without inspecting strings.
//!
//! # Error Categories
//!
//! - [`EntityError`]: the addressed request does not exist (404)
//! - [`ValidationError`]: missing fields, unknown enum values, malformed input (400)
//! - [`AttachmentError`]: image rejected (400) or image backend failure (500)
//! - [`StorageError`]: the record store is unavailable or misbehaving (500)
//! - [`ConfigError`]: invalid configuration (500)
//!
//! # Example
//!
//! ```rust,ignore
//! match store.get(&id).await {
//!     Ok(request) => println!("{}", request.item_name_en),
//!     Err(ProcurementError::Entity(EntityError::NotFound { id })) => {
//!         println!("request {} is gone", id);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use crate::attachments::AttachmentError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Result alias used across the crate
pub type Result<T, E = ProcurementError> = std::result::Result<T, E>;

/// The main error type of the service
#[derive(Debug)]
pub enum ProcurementError {
    /// The addressed record does not exist
    Entity(EntityError),

    /// Input rejected before reaching the store
    Validation(ValidationError),

    /// Image attachment rejected or its backend failed
    Attachment(AttachmentError),

    /// Record store failure
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Should not happen in normal operation
    Internal(String),
}

impl fmt::Display for ProcurementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcurementError::Entity(e) => write!(f, "{}", e),
            ProcurementError::Validation(e) => write!(f, "{}", e),
            ProcurementError::Attachment(e) => write!(f, "{}", e),
            ProcurementError::Storage(e) => write!(f, "{}", e),
            ProcurementError::Config(e) => write!(f, "{}", e),
            ProcurementError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ProcurementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcurementError::Entity(e) => Some(e),
            ProcurementError::Validation(e) => Some(e),
            ProcurementError::Attachment(e) => Some(e),
            ProcurementError::Storage(e) => Some(e),
            ProcurementError::Config(e) => Some(e),
            ProcurementError::Internal(_) => None,
        }
    }
}

/// Error body returned to HTTP clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ProcurementError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProcurementError::Entity(e) => e.status_code(),
            ProcurementError::Validation(_) => StatusCode::BAD_REQUEST,
            ProcurementError::Attachment(e) => {
                if e.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            ProcurementError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProcurementError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProcurementError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ProcurementError::Entity(e) => e.error_code(),
            ProcurementError::Validation(_) => "VALIDATION_ERROR",
            ProcurementError::Attachment(e) => e.error_code(),
            ProcurementError::Storage(_) => "STORAGE_ERROR",
            ProcurementError::Config(_) => "CONFIG_ERROR",
            ProcurementError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ProcurementError::Entity(EntityError::NotFound { id }) => {
                Some(serde_json::json!({ "id": id.to_string() }))
            }
            ProcurementError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            ProcurementError::Validation(ValidationError::InvalidEnum {
                field, allowed, ..
            }) => Some(serde_json::json!({ "field": field, "allowed": allowed })),
            _ => None,
        }
    }

    /// Shorthand for [`EntityError::NotFound`]
    pub fn not_found(id: Uuid) -> Self {
        ProcurementError::Entity(EntityError::NotFound { id })
    }
}

impl IntoResponse for ProcurementError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to addressing a stored record
#[derive(Debug)]
pub enum EntityError {
    /// No procurement request carries this id
    NotFound { id: Uuid },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { id } => {
                write!(f, "Procurement request '{}' not found", id)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "REQUEST_NOT_FOUND",
        }
    }
}

impl From<EntityError> for ProcurementError {
    fn from(err: EntityError) -> Self {
        ProcurementError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required text field is missing or blank after trimming
    MissingField { field: String },

    /// Several fields failed at once
    FieldErrors(Vec<FieldValidationError>),

    /// A restricted text field carries a value outside its set
    InvalidEnum {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Body could not be decoded
    InvalidJson { message: String },

    /// Multipart body could not be decoded
    InvalidMultipart { message: String },

    /// Query string could not be decoded
    InvalidQuery { message: String },

    /// Path id is not a UUID
    InvalidId { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField { field } => {
                write!(f, "Field '{}' is required", field)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidEnum {
                field,
                value,
                allowed,
            } => {
                write!(
                    f,
                    "'{}' is not a valid {} (expected one of: {})",
                    value,
                    field,
                    allowed.join(", ")
                )
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::InvalidMultipart { message } => {
                write!(f, "Invalid multipart body: {}", message)
            }
            ValidationError::InvalidQuery { message } => {
                write!(f, "Invalid query string: {}", message)
            }
            ValidationError::InvalidId { value } => {
                write!(f, "Invalid request id: {}", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Collapse a list of missing fields into the most specific variant
    pub fn missing(fields: Vec<&str>) -> Option<Self> {
        match fields.as_slice() {
            [] => None,
            [field] => Some(ValidationError::MissingField {
                field: field.to_string(),
            }),
            _ => Some(ValidationError::FieldErrors(
                fields
                    .into_iter()
                    .map(|field| FieldValidationError {
                        field: field.to_string(),
                        message: "is required".to_string(),
                    })
                    .collect(),
            )),
        }
    }
}

impl From<ValidationError> for ProcurementError {
    fn from(err: ValidationError) -> Self {
        ProcurementError::Validation(err)
    }
}

// =============================================================================
// Attachment Errors
// =============================================================================

impl From<AttachmentError> for ProcurementError {
    fn from(err: AttachmentError) -> Self {
        ProcurementError::Attachment(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Connection error
    ConnectionError { backend: String, message: String },

    /// Query execution error
    QueryError { backend: String, message: String },

    /// Stored document does not decode into a record (or the reverse)
    SerializationError { message: String },

    /// A lock guarding in-process state was poisoned
    LockPoisoned,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
            StorageError::LockPoisoned => write!(f, "In-memory store lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for ProcurementError {
    fn from(err: StorageError) -> Self {
        ProcurementError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Missing required field in configuration
    MissingField { field: String, context: String },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::MissingField { field, context } => {
                write!(f, "Missing required field '{}' in {}", field, context)
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ProcurementError {
    fn from(err: ConfigError) -> Self {
        ProcurementError::Config(err)
    }
}
