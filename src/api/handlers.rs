//! HTTP API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::debug;

use crate::error::StoreError;
use crate::metrics;
use crate::store::types::{DeleteResponse, ErrorBody};
use crate::store::{HealthStatus, NewUser, User, UserList, UserPatch, UserStore};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// The user collection.
    pub store: UserStore,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state with the seeded store and no metrics.
    pub fn new() -> Self {
        Self::with_store(UserStore::seeded())
    }

    /// Create app state around an existing store.
    pub fn with_store(store: UserStore) -> Self {
        Self {
            store,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` route.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::InvalidInput | StoreError::MalformedBody => StatusCode::BAD_REQUEST,
            StoreError::NotFound => StatusCode::NOT_FOUND,
        };
        metrics::inc_store_rejection(self.reason());
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// A path id that is not a number cannot match any record.
fn parse_user_id(raw: &str) -> Result<u64, StoreError> {
    raw.parse().map_err(|_| StoreError::NotFound)
}

/// Unwrap a JSON body. A request without a JSON content type carries no
/// fields; a body that does not parse into `T` is rejected as a whole.
fn body_fields<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, StoreError> {
    match body {
        Ok(Json(fields)) => Ok(fields),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Rejecting request body");
            Err(StoreError::MalformedBody)
        }
    }
}

/// Health check handler - always returns 200.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::now())
}

/// List all users with their count.
pub async fn list_users(State(state): State<AppState>) -> Json<UserList> {
    let users = state.store.list().await;
    debug!(count = users.len(), "Listing users");
    Json(UserList {
        count: users.len(),
        users,
    })
}

/// Fetch one user.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, StoreError> {
    let id = parse_user_id(&id)?;
    let user = state.store.get(id).await?;
    Ok(Json(user))
}

/// Create a user - returns 201 with the stored record.
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), StoreError> {
    let fields = body_fields(body)?;
    let user = state.store.create(fields).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Merge fields onto an existing user.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<User>, StoreError> {
    let id = parse_user_id(&id)?;
    let patch = body_fields(body)?;
    let user = state.store.update(id, patch).await?;
    Ok(Json(user))
}

/// Remove a user.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, StoreError> {
    let id = parse_user_id(&id)?;
    state.store.delete(id).await?;
    Ok(Json(DeleteResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// Prometheus scrape endpoint - 503 when no recorder is installed.
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics disabled").into_response(),
    }
}
