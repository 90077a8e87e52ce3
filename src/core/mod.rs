//! Core module containing the error taxonomy, the store trait and shared helpers

pub mod error;
pub mod query;
pub mod service;
pub mod timestamp;

pub use error::{ProcurementError, Result};
pub use query::{ListParams, RequestFilter};
pub use service::RequestStore;
