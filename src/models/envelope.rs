// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Uniform response wrapper used by every backend endpoint.

use serde::{Deserialize, Serialize};

/// `{success, message, data}` wrapper returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
    /// Total row count on list endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl<T> Envelope<T> {
    /// Successful envelope with an empty message.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: String::new(),
            data,
            count: None,
        }
    }

    /// Transform the payload, keeping the envelope metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            message: self.message,
            data: f(self.data),
            count: self.count,
        }
    }
}
