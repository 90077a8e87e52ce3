//! Domain entities: the procurement request record and its inputs

pub mod macros;
pub mod patch;
pub mod request;
pub mod submission;

pub use patch::{ChecklistPatch, RequestPatch};
pub use request::{Category, Checklist, Priority, ProcurementRequest, Status};
pub use submission::NewRequest;
