//! User record types shared by the store, the HTTP API and the polling client.

use serde::{Deserialize, Serialize};

/// Role assigned when a create request omits one.
pub const DEFAULT_ROLE: &str = "User";

/// Service identity tag reported by the health endpoint.
pub const SERVICE_NAME: &str = "user-api-backend";

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Contact email (presence-checked only).
    pub email: String,
    /// Free-form role label, e.g. "Admin" or "User".
    pub role: String,
}

impl User {
    /// One-line summary for logs: `name (email)`.
    pub fn summary(&self) -> String {
        format!("{} ({})", self.name, self.email)
    }
}

/// Fields accepted by create. Clients never supply `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl NewUser {
    /// Build a fully-populated create request.
    pub fn new(name: &str, email: &str, role: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            role: Some(role.to_string()),
        }
    }
}

/// Partial update. Absent fields are left untouched; any `id` in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Response body of the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub count: usize,
}

/// Response body of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always "healthy".
    pub status: String,
    /// Service identity tag.
    pub service: String,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
}

impl HealthStatus {
    /// Current liveness payload.
    pub fn now() -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            timestamp: chrono::Utc::now()
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Response body of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Error body returned for 4xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_ignores_id_and_unknown_fields() {
        let patch: UserPatch =
            serde_json::from_str(r#"{"id": 99, "role": "Admin", "nickname": "x"}"#).unwrap();
        assert_eq!(
            patch,
            UserPatch {
                role: Some("Admin".to_string()),
                ..UserPatch::default()
            }
        );
    }

    #[test]
    fn health_timestamp_is_iso_utc_millis() {
        let health = HealthStatus::now();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, SERVICE_NAME);
        // 2024-01-01T00:00:00.000Z
        assert_eq!(health.timestamp.len(), 24);
        assert!(health.timestamp.ends_with('Z'));
    }

    #[test]
    fn new_user_omits_absent_fields_when_serialized() {
        let body = serde_json::to_value(NewUser {
            name: Some("X".to_string()),
            ..NewUser::default()
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "name": "X" }));
    }
}
