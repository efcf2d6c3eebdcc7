//! HTTP client for the user record store.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::ClientError;
use crate::store::{HealthStatus, NewUser, User, UserList};

/// Calls the polling session makes against the record store.
pub trait UserApi {
    /// `GET /health`.
    fn health(&self) -> impl Future<Output = Result<HealthStatus, ClientError>> + Send;

    /// `GET /api/users`.
    fn list_users(&self) -> impl Future<Output = Result<UserList, ClientError>> + Send;

    /// `POST /api/users`.
    fn create_user(
        &self,
        user: &NewUser,
    ) -> impl Future<Output = Result<User, ClientError>> + Send;
}

/// `reqwest`-based record store client.
#[derive(Debug, Clone)]
pub struct UserApiClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL of the record store.
    base_url: Url,
}

impl UserApiClient {
    /// Create a client from config. Every call is bounded by `http_timeout_ms`.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Self::with_timeout(config.api_base_url()?, config.http_timeout())
    }

    /// Create a client for an explicit base URL and per-call bound.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    /// Decode a 2xx JSON body, or turn the status into an error.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

impl UserApi for UserApiClient {
    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.endpoint("/health")?;
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<UserList, ClientError> {
        let url = self.endpoint("/api/users")?;
        let response = self.http.get(url).send().await?;
        let list: UserList = Self::decode(response).await?;
        debug!(count = list.count, "Fetched users");
        Ok(list)
    }

    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        let url = self.endpoint("/api/users")?;
        let response = self.http.post(url).json(user).send().await?;
        Self::decode(response).await
    }
}
