//! HTTP API over the decision core.
//!
//! Routes are nested under `/api/v1/`. `api_router()` returns a composable
//! `Router`; `start_api_server()` binds and runs it.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::ApiContext;
