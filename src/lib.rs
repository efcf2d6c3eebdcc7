//! In-memory user CRUD API with a companion polling client.
//!
//! The record store serves a small JSON contract:
//!
//! ```text
//! GET    /health          liveness payload
//! GET    /api/users       {users, count}
//! GET    /api/users/:id   record | 404
//! POST   /api/users       201 record | 400
//! PUT    /api/users/:id   merged record | 404
//! DELETE /api/users/:id   {message} | 404
//! ```
//!
//! The polling client calls it on a fixed interval: every 3rd cycle creates
//! a sample user, the others fetch the list, and every 5th cycle also checks
//! health. Failures are logged and the schedule carries on.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`store`]: User records and the in-memory store
//! - [`api`]: HTTP routes and handlers
//! - [`poller`]: Schedule, HTTP client and polling session
//! - [`metrics`]: Prometheus counters and histograms
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod poller;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
