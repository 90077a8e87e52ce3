//! HTTP server for the procurement API
//!
//! - [`ServerBuilder`] assembles configuration, record store and image store
//! - [`ServerHost`] is the state shared by all handlers
//! - [`RestExposure`] turns a host into an Axum router

pub mod builder;
pub mod exposure;
pub mod extract;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use exposure::RestExposure;
pub use host::ServerHost;
