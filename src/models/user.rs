//! User model and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Access level assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// User profile as returned by `/user/profile/` and the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub bio: Option<String>,
    /// When the account was created
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Overlay the fields present in a backend payload onto this user.
    ///
    /// Keys absent from `patch` keep their current values; unknown keys are
    /// ignored. Fails if a present key carries a value of the wrong type.
    pub fn merged_with(&self, patch: &Value) -> serde_json::Result<User> {
        let mut current = serde_json::to_value(self)?;
        if let (Value::Object(base), Value::Object(fields)) = (&mut current, patch) {
            for (key, value) in fields {
                if base.contains_key(key) {
                    base.insert(key.clone(), value.clone());
                }
            }
        }
        serde_json::from_value(current)
    }
}

/// Payload of a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Refresh request body.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh response payload.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessToken {
    pub access: String,
}

/// Account registration form (also used for admin accounts).
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub password2: String,

    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
}

/// Partial profile update; only fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> User {
        serde_json::from_value(json!({
            "id": 7,
            "username": "jdoe",
            "email": "jdoe@example.com",
            "first_name": "Jane",
            "last_name": "Doe",
            "role": "admin",
            "bio": null,
            "date_joined": "2025-03-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let user = sample_user();
        let merged = user.merged_with(&json!({"bio": "new bio"})).unwrap();

        assert_eq!(merged.bio.as_deref(), Some("new bio"));
        assert_eq!(merged.role, Role::Admin);
        assert_eq!(merged.email, user.email);
        assert_eq!(merged.date_joined, user.date_joined);
    }

    #[test]
    fn test_merge_rejects_wrong_type() {
        let user = sample_user();
        assert!(user.merged_with(&json!({"role": 5})).is_err());
    }

    #[test]
    fn test_register_validation() {
        let request = RegisterRequest {
            email: "not-an-email".to_string(),
            username: Some("jd".to_string()),
            password: "longenough".to_string(),
            password2: "different".to_string(),
            first_name: String::new(),
            last_name: "Doe".to_string(),
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password2"));
        assert!(fields.contains_key("first_name"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn test_profile_update_skips_unset() {
        let update = ProfileUpdate {
            bio: Some("hello".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"bio": "hello"}));
    }
}
