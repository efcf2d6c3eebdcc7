//! HTTP API module for the user CRUD contract and health endpoint.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_router, serve};
