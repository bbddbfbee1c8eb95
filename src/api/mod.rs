//! REST API layer.
//!
//! Exposes the medication store and the dose ledger as HTTP endpoints.
//! Routes are nested under `/api/`; the router is composable and can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_server, ApiServer};
pub use types::ApiContext;
