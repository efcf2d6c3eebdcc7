//! Record store module.
//!
//! This module handles:
//! - User record types and wire bodies
//! - The in-memory collection and its CRUD operations

pub mod types;
pub mod users;

pub use types::{HealthStatus, NewUser, User, UserList, UserPatch, DEFAULT_ROLE, SERVICE_NAME};
pub use users::{seed_users, UserStore};
