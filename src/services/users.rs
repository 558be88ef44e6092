// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin user management.

use crate::error::Result;
use crate::models::{AuthPayload, Envelope, RegisterRequest, User};
use crate::services::{ApiClient, ApiRequest};
use std::sync::Arc;
use validator::Validate;

const USERS: &str = "/user/users/";
const ADMIN_REGISTER: &str = "/user/auth/admin/register/";

#[derive(Clone)]
pub struct UserAdminService {
    api: Arc<ApiClient>,
}

impl UserAdminService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Envelope<Vec<User>>> {
        self.api.send(&ApiRequest::get(USERS)).await
    }

    pub async fn get(&self, id: u64) -> Result<Envelope<User>> {
        self.api
            .send(&ApiRequest::get(format!("{}{}/", USERS, id)))
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<Envelope<()>> {
        let envelope = self
            .api
            .send_empty(&ApiRequest::delete(format!("{}{}/", USERS, id)))
            .await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(envelope)
    }

    /// Create an admin account. The caller's own session is unchanged; the
    /// credentials issued for the new account are discarded.
    pub async fn register_admin(&self, form: &RegisterRequest) -> Result<User> {
        form.validate()?;

        let payload = self
            .api
            .send::<AuthPayload>(&ApiRequest::post(ADMIN_REGISTER, form)?)
            .await?
            .data;

        tracing::info!(user_id = payload.user.id, "Admin account created");
        Ok(payload.user)
    }
}
