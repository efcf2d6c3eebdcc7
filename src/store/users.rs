//! In-memory user record store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::types::{NewUser, User, UserPatch, DEFAULT_ROLE};
use crate::error::StoreError;
use crate::metrics;

/// Authoritative in-memory user collection.
///
/// Cloning shares the same collection. Every operation takes the lock exactly
/// once, so reads never observe a half-applied mutation and id assignment
/// cannot race.
#[derive(Debug, Clone)]
pub struct UserStore {
    users: Arc<RwLock<Vec<User>>>,
}

impl UserStore {
    /// Create a store holding the given records, in order.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    /// Create an empty store.
    pub fn empty() -> Self {
        Self::with_users(Vec::new())
    }

    /// Create a store with the demo seed set (ids 1..=3).
    pub fn seeded() -> Self {
        Self::with_users(seed_users())
    }

    /// All records in insertion order.
    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    /// Number of records.
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Look up a record by id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: u64) -> Result<User, StoreError> {
        let users = self.users.read().await;
        let user = users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        debug!(user = %user.summary(), "User found");
        Ok(user)
    }

    /// Create a record. Name and email must be present and non-empty.
    ///
    /// The new id is one more than the current maximum (1 for an empty store),
    /// so deleting the highest id and creating again reuses that number.
    #[instrument(skip(self, fields))]
    pub async fn create(&self, fields: NewUser) -> Result<User, StoreError> {
        let name = non_empty(fields.name).ok_or(StoreError::InvalidInput)?;
        let email = non_empty(fields.email).ok_or(StoreError::InvalidInput)?;
        let role = non_empty(fields.role).unwrap_or_else(|| DEFAULT_ROLE.to_string());

        let mut users = self.users.write().await;
        let id = next_id(&users);
        let user = User {
            id,
            name,
            email,
            role,
        };
        users.push(user.clone());

        info!(id, name = %user.name, "User created");
        metrics::inc_users_created();
        Ok(user)
    }

    /// Merge the present fields of `patch` onto an existing record.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: u64, patch: UserPatch) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }

        info!(id, "User updated");
        metrics::inc_users_updated();
        Ok(user.clone())
    }

    /// Remove a record, returning it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        let removed = users.remove(index);

        info!(id, "User deleted");
        metrics::inc_users_deleted();
        Ok(removed)
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::seeded()
    }
}

/// The records every fresh process starts with.
pub fn seed_users() -> Vec<User> {
    [
        (1, "Alice Johnson", "alice@example.com", "Admin"),
        (2, "Bob Smith", "bob@example.com", "User"),
        (3, "Charlie Brown", "charlie@example.com", "User"),
    ]
    .into_iter()
    .map(|(id, name, email, role)| User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
    })
    .collect()
}

fn next_id(users: &[User]) -> u64 {
    users.iter().map(|u| u.id).max().map_or(1, |max| max + 1)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
