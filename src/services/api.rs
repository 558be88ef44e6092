// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated request pipeline for the inventory REST backend.
//!
//! Handles:
//! - Attaching the default bearer credential to every request
//! - One silent access-token renewal after a 401, then one replay
//! - Serializing concurrent renewals so only one refresh call is made
//! - Forced logout when the refresh credential is rejected

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::user::{AccessToken, RefreshRequest};
use crate::models::Envelope;
use crate::routes::{Navigator, LOGIN_PATH};
use crate::services::TokenStore;
use crate::state::SessionStore;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Token refresh endpoint, relative to the API root.
pub const REFRESH_PATH: &str = "/user/auth/token/refresh/";

/// Replays allowed per originating request after a renewal.
const MAX_REPLAYS: u32 = 1;

/// Description of an outgoing call. Rebuilt into a fresh HTTP request for
/// every attempt, so a replay never shares mutable state with the original.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    /// Attach the default bearer credential
    authenticated: bool,
    /// Attempt a renewal and replay on 401
    renew_on_unauthorized: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
            renew_on_unauthorized: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Self::new(Method::POST, path).with_json(body)
    }

    pub fn put(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Self::new(Method::PUT, path).with_json(body)
    }

    pub fn with_json(mut self, body: &impl Serialize) -> Result<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Send without credentials and without renewal (login, registration).
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self.renew_on_unauthorized = false;
        self
    }

    /// Send with the bearer credential but surface a 401 unchanged.
    pub fn without_renewal(mut self) -> Self {
        self.renew_on_unauthorized = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Outcome of a renewal attempt.
#[derive(Debug)]
pub enum Renewal {
    /// A fresh access credential is stored and set as the bearer
    Renewed(String),
    /// No refresh credential stored; nothing was attempted
    NoRefreshCredential,
    /// The refresh call failed or was rejected
    Failed(ClientError),
}

/// HTTP client for the inventory backend with session continuity.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    /// Serializes renewals; holders re-check the stored credential first.
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(
        config: &Config,
        tokens: Arc<TokenStore>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
            session,
            navigator,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─── Public request API ──────────────────────────────────────────────────

    /// Send a request and decode the envelope payload.
    pub async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<Envelope<T>> {
        let response = self.dispatch(request).await?;
        decode_envelope(response).await
    }

    /// Send a request whose response may have no body (e.g. 204 on delete).
    pub async fn send_empty(&self, request: &ApiRequest) -> Result<Envelope<()>> {
        let response = self.dispatch(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::from_response_body(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Envelope::ok(()));
        }

        let envelope: Envelope<Option<Value>> = parse_envelope(status, &body)?;
        Ok(envelope.map(|_| ()))
    }

    // ─── Pipeline ────────────────────────────────────────────────────────────

    /// Issue the request, renewing and replaying at most once on 401.
    ///
    /// The returned response may itself be a failure; only transport errors
    /// are reported as `Err`.
    async fn dispatch(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let mut bearer = if request.authenticated {
            self.tokens.bearer()
        } else {
            None
        };
        let mut replays = 0;

        loop {
            let response = self.execute(request, bearer.as_deref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED
                || !request.renew_on_unauthorized
                || replays >= MAX_REPLAYS
            {
                return Ok(response);
            }
            replays += 1;

            match self.renew(bearer.as_deref()).await {
                Renewal::Renewed(access) => {
                    tracing::debug!(
                        method = %request.method,
                        path = %request.path,
                        "Replaying request with renewed credential"
                    );
                    bearer = Some(access);
                }
                Renewal::NoRefreshCredential => return Ok(response),
                Renewal::Failed(e) => {
                    self.force_logout(&e);
                    return Ok(response);
                }
            }
        }
    }

    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        builder.send().await.map_err(|e| {
            tracing::warn!(method = %request.method, path = %request.path, error = %e, "Request failed");
            ClientError::from(e)
        })
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Obtain a fresh access credential after `stale` was rejected.
    ///
    /// 1. Acquire the renewal lock (one renewal in flight at a time)
    /// 2. If the stored credential no longer matches `stale`, another caller
    ///    already renewed: reuse its credential without a network call
    /// 3. Otherwise call the refresh endpoint and store the result
    pub async fn renew(&self, stale: Option<&str>) -> Renewal {
        let _guard = self.refresh_lock.lock().await;

        if let (Some(stale), Some(current)) = (stale, self.tokens.access()) {
            if current != stale {
                tracing::debug!("Access token already renewed by another request");
                self.tokens.set_bearer(&current);
                return Renewal::Renewed(current);
            }
        }

        let Some(refresh) = self.tokens.refresh() else {
            tracing::debug!("No refresh credential stored, skipping renewal");
            return Renewal::NoRefreshCredential;
        };

        tracing::info!("Access token rejected, refreshing");

        match self.request_access_token(&refresh).await {
            Ok(access) => {
                if let Err(e) = self.tokens.save_access(&access) {
                    tracing::warn!(
                        error = %e,
                        "Renewed access token not persisted; session will not survive a restart"
                    );
                }
                self.tokens.set_bearer(&access);
                tracing::info!("Access token renewed");
                Renewal::Renewed(access)
            }
            Err(e) => Renewal::Failed(e),
        }
    }

    /// Exchange a refresh credential for a new access credential.
    async fn request_access_token(&self, refresh: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, REFRESH_PATH);

        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh })
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Token refresh request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = ClientError::from_response_body(status.as_u16(), &body);
            tracing::warn!(status = %status, reason = %reason, "Token refresh rejected");
            return Err(ClientError::SessionExpired);
        }

        let envelope: Envelope<AccessToken> = decode_envelope(response).await.map_err(|e| {
            tracing::warn!(reason = %e, "Token refresh rejected");
            ClientError::SessionExpired
        })?;
        Ok(envelope.data.access)
    }

    /// Clear every credential, sign the session out and send the user to login.
    fn force_logout(&self, reason: &ClientError) {
        tracing::warn!(error = %reason, "Session renewal failed, forcing logout");
        self.tokens.clear();
        self.tokens.clear_bearer();
        self.session.sign_out();
        self.navigator.navigate(LOGIN_PATH);
    }
}

/// Check response status and parse the envelope body.
async fn decode_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<Envelope<T>> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::from_response_body(status.as_u16(), &body));
    }

    parse_envelope(status, &body)
}

/// Success flag and message, read before the payload is decoded.
#[derive(Debug, Deserialize)]
struct EnvelopeStatus {
    success: bool,
    #[serde(default)]
    message: String,
}

/// Parse an envelope body. A 2xx envelope can still report failure, in
/// which case `data` is usually null or absent and is never decoded.
fn parse_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Envelope<T>> {
    let value: Value = serde_json::from_str(body).map_err(decode_error)?;
    let header = EnvelopeStatus::deserialize(&value).map_err(decode_error)?;

    if !header.success {
        let message = if header.message.is_empty() {
            "Request failed".to_string()
        } else {
            header.message
        };
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_value(value).map_err(decode_error)
}

fn decode_error(e: serde_json::Error) -> ClientError {
    ClientError::Decode(format!("JSON parse error: {}", e))
}
