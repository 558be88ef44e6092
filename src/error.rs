// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with human-readable messages.
//!
//! Every error surfaced to a view is a `ClientError`; its `Display` output is
//! the message the view shows.

use serde_json::Value;
use std::collections::BTreeMap;

/// Field name -> messages reported for that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Client error type covering credential, validation, session and transport failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{message}")]
    ValidationFailed { message: String, fields: FieldErrors },

    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    #[error("Authentication required")]
    Unauthorized,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    OAuth(String),
}

impl ClientError {
    /// True when the backend rejected the bearer credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized
                | ClientError::SessionExpired
                | ClientError::Api { status: 401, .. }
        )
    }

    /// Per-field messages for a validation failure, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::ValidationFailed { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Build an error from a non-success backend response body.
    ///
    /// Precedence: envelope `message`, then DRF `detail`, then a field-error
    /// dictionary (under `errors` or at the top level).
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let fallback = || {
            if status == 401 {
                ClientError::Unauthorized
            } else {
                ClientError::Api {
                    status,
                    message: format!("Request failed with status {}", status),
                }
            }
        };

        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
            return fallback();
        };

        let fields = map
            .get("errors")
            .and_then(collect_field_errors)
            .or_else(|| {
                (status == 400)
                    .then(|| collect_field_errors(&Value::Object(map.clone())))
                    .flatten()
            });

        let message = map
            .get("message")
            .or_else(|| map.get("detail"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        match (message, fields) {
            (message, Some(fields)) if !fields.is_empty() => ClientError::ValidationFailed {
                message: message.unwrap_or_else(|| summarize_fields(&fields)),
                fields,
            },
            (Some(message), _) => ClientError::Api { status, message },
            (None, _) => fallback(),
        }
    }

    /// Convert into a credential error for login/registration, keeping the
    /// backend's wording.
    ///
    /// Only rejections count: a `success: false` envelope (2xx) or a 400/401.
    /// Other statuses stay `Api` errors.
    pub(crate) fn into_credential_error(self) -> Self {
        match self {
            ClientError::Api { status, message }
                if (200..300).contains(&status) || status == 400 || status == 401 =>
            {
                ClientError::InvalidCredentials(message)
            }
            ClientError::Unauthorized => {
                ClientError::InvalidCredentials("Invalid credentials".to_string())
            }
            other => other,
        }
    }
}

/// Extract `{"field": "msg" | ["msg", ...]}` entries, skipping envelope keys.
fn collect_field_errors(value: &Value) -> Option<FieldErrors> {
    const ENVELOPE_KEYS: [&str; 8] = [
        "success", "message", "detail", "data", "errors", "count", "code", "messages",
    ];

    let map = value.as_object()?;
    let mut fields = FieldErrors::new();

    for (key, val) in map {
        if ENVELOPE_KEYS.contains(&key.as_str()) {
            continue;
        }
        let messages: Vec<String> = match val {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => continue,
        };
        if !messages.is_empty() {
            fields.insert(key.clone(), messages);
        }
    }

    (!fields.is_empty()).then_some(fields)
}

fn summarize_fields(fields: &FieldErrors) -> String {
    fields
        .values()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<crate::config::ConfigError> for ClientError {
    fn from(err: crate::config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: FieldErrors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field))
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        ClientError::ValidationFailed {
            message: summarize_fields(&fields),
            fields,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
