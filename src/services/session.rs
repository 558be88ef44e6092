// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session context: login, registration, logout, renewal and the one-time
//! startup restore.
//!
//! All transitions go through `SessionStore`, which the views observe.

use crate::error::{ClientError, Result};
use crate::models::user::LoginRequest;
use crate::models::{AuthPayload, ProfileUpdate, RegisterRequest, User};
use crate::services::api::{ApiClient, ApiRequest, Renewal};
use crate::services::TokenStore;
use crate::state::{SessionState, SessionStore};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{watch, OnceCell};
use validator::Validate;

pub const LOGIN_ENDPOINT: &str = "/user/auth/login/";
pub const REGISTER_ENDPOINT: &str = "/user/auth/register/";
pub const PROFILE_ENDPOINT: &str = "/user/profile/";

/// How the startup check ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    /// No stored access credential; no network calls made
    NoCredential,
    /// Stored credential accepted
    Restored,
    /// Stored credential rejected, renewal succeeded
    Renewed,
    /// Stored credential rejected and renewal failed; credentials cleared
    RenewalFailed,
}

/// Process-wide authentication context.
pub struct Session {
    api: Arc<ApiClient>,
    tokens: Arc<TokenStore>,
    state: Arc<SessionStore>,
    startup: OnceCell<StartupOutcome>,
}

impl Session {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            tokens: api.tokens().clone(),
            state: api.session_store().clone(),
            api,
            startup: OnceCell::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    // ─── Startup ─────────────────────────────────────────────────────────────

    /// Restore the session from stored credentials.
    ///
    /// Runs once; later calls return the first outcome. `initializing` is
    /// cleared at the end regardless of the branch taken.
    pub async fn initialize(&self) -> StartupOutcome {
        *self
            .startup
            .get_or_init(|| async move {
                let outcome = self.restore().await;
                self.state.finish_initializing();
                tracing::info!(outcome = ?outcome, "Session startup check complete");
                outcome
            })
            .await
    }

    async fn restore(&self) -> StartupOutcome {
        let Some(access) = self.tokens.access() else {
            tracing::info!("No stored credential, starting anonymous");
            return StartupOutcome::NoCredential;
        };

        self.tokens.set_bearer(&access);

        // Renewal is handled below, without the pipeline's forced logout
        let request = ApiRequest::get(PROFILE_ENDPOINT).without_renewal();
        match self.fetch_profile(request).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Session restored");
                self.state.authenticate(user);
                StartupOutcome::Restored
            }
            Err(e) => {
                tracing::info!(error = %e, "Stored credential rejected, attempting renewal");
                if self.refresh_session().await {
                    StartupOutcome::Renewed
                } else {
                    tracing::warn!("Session renewal failed, continuing anonymous");
                    self.logout();
                    StartupOutcome::RenewalFailed
                }
            }
        }
    }

    // ─── Transitions ─────────────────────────────────────────────────────────

    /// Log in with email and password.
    ///
    /// On failure the existing state (if any) is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let request =
            ApiRequest::post(LOGIN_ENDPOINT, &LoginRequest { email, password })?.anonymous();

        let payload = self
            .api
            .send::<AuthPayload>(&request)
            .await
            .map_err(ClientError::into_credential_error)?
            .data;

        self.establish(payload)
    }

    /// Register a new account; the backend logs it in directly.
    pub async fn register(&self, form: &RegisterRequest) -> Result<User> {
        form.validate()?;

        let request = ApiRequest::post(REGISTER_ENDPOINT, form)?.anonymous();

        let payload = self
            .api
            .send::<AuthPayload>(&request)
            .await
            .map_err(ClientError::into_credential_error)?
            .data;

        self.establish(payload)
    }

    /// End the session locally. Never fails and makes no network call.
    pub fn logout(&self) {
        self.tokens.clear();
        self.tokens.clear_bearer();
        self.state.sign_out();
        tracing::info!("Logged out");
    }

    /// Renew the access credential and reload the profile.
    ///
    /// Returns `false` on any failure, including a renewed credential that
    /// could not be persisted, without touching `authenticated` or
    /// `current_user`. Returns `false` immediately, with no side effects,
    /// when no refresh credential is stored.
    pub async fn refresh_session(&self) -> bool {
        if self.tokens.refresh().is_none() {
            return false;
        }

        let stale = self.tokens.access();
        match self.api.renew(stale.as_deref()).await {
            Renewal::Renewed(access) => {
                if self.tokens.access().as_deref() != Some(access.as_str()) {
                    tracing::warn!("Renewed access token could not be stored");
                    return false;
                }
            }
            Renewal::NoRefreshCredential => return false,
            Renewal::Failed(e) => {
                tracing::info!(error = %e, "Session refresh failed");
                return false;
            }
        }

        let request = ApiRequest::get(PROFILE_ENDPOINT).without_renewal();
        match self.fetch_profile(request).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Session refreshed");
                self.state.authenticate(user);
                true
            }
            Err(e) => {
                tracing::info!(error = %e, "Profile fetch after refresh failed");
                false
            }
        }
    }

    /// Update the current user's profile.
    ///
    /// Fields present in the response replace the cached ones; absent fields
    /// keep their values.
    pub async fn update_user(&self, update: &ProfileUpdate) -> Result<User> {
        let request = ApiRequest::put(PROFILE_ENDPOINT, update)?;
        let patch = self.api.send::<Value>(&request).await?.data;

        let user = match self.state.snapshot().current_user {
            Some(current) => current.merged_with(&patch),
            None => serde_json::from_value(patch),
        }
        .map_err(|e| ClientError::Decode(format!("Invalid profile payload: {}", e)))?;

        self.state.replace_user(user.clone());
        tracing::info!(user_id = user.id, "Profile updated");
        Ok(user)
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    async fn fetch_profile(&self, request: ApiRequest) -> Result<User> {
        Ok(self.api.send::<User>(&request).await?.data)
    }

    /// Store credentials from a login/registration payload and sign in.
    fn establish(&self, payload: AuthPayload) -> Result<User> {
        self.tokens.save(&payload.access, &payload.refresh)?;
        self.tokens.set_bearer(&payload.access);

        tracing::info!(user_id = payload.user.id, role = ?payload.user.role, "Logged in");
        self.state.authenticate(payload.user.clone());
        Ok(payload.user)
    }
}
