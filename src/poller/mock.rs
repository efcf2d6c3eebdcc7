//! Mock record store client for unit testing.
//!
//! Serves calls from an in-process [`UserStore`] and records every call, so
//! session behavior can be checked without a network.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ClientError, StoreError};
use crate::store::{HealthStatus, NewUser, User, UserList, UserStore};

use super::client::UserApi;
use super::schedule::Action;

/// Mock record store client.
#[derive(Debug, Clone)]
pub struct MockUserApi {
    /// Backing store for successful calls.
    store: UserStore,
    /// Calls received, in order.
    calls: Arc<Mutex<Vec<Action>>>,
    /// Answer every call with 503, as an unavailable store would.
    fail: bool,
}

impl MockUserApi {
    /// Mock backed by the seeded store.
    pub fn new() -> Self {
        Self::with_store(UserStore::seeded())
    }

    /// Mock backed by the given store.
    pub fn with_store(store: UserStore) -> Self {
        Self {
            store,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Mock whose every call fails, as if the store were unreachable.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<Action> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The backing store.
    pub fn store(&self) -> &UserStore {
        &self.store
    }

    fn record(&self, action: Action) -> Result<(), ClientError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
        if self.fail {
            return Err(ClientError::Status {
                status: 503,
                reason: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockUserApi {
    fn default() -> Self {
        Self::new()
    }
}

fn store_error(err: StoreError) -> ClientError {
    let status = match err {
        StoreError::InvalidInput | StoreError::MalformedBody => 400,
        StoreError::NotFound => 404,
    };
    ClientError::Status {
        status,
        reason: err.to_string(),
    }
}

impl UserApi for MockUserApi {
    async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.record(Action::HealthCheck)?;
        Ok(HealthStatus::now())
    }

    async fn list_users(&self) -> Result<UserList, ClientError> {
        self.record(Action::Fetch)?;
        let users = self.store.list().await;
        Ok(UserList {
            count: users.len(),
            users,
        })
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        self.record(Action::Create)?;
        self.store.create(user.clone()).await.map_err(store_error)
    }
}
