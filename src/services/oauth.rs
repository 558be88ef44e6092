// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth-style redirect sign-in.
//!
//! The provider sends the browser back to the callback view with a `code`.
//! The backend completes the exchange and keeps the session, so the client
//! only needs to renew its credentials once the code arrives.

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::routes::DASHBOARD_PATH;
use crate::services::Session;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use reqwest::Url;

const OAUTH_SCOPE: &str = "openid email profile";

/// Build the provider authorization URL.
///
/// `return_to` is the view to land on after sign-in; it travels in the
/// `state` parameter as `base64("return_to|timestamp_hex")`.
pub fn authorize_url(config: &Config, return_to: &str) -> Result<String> {
    let client_id = config.require_oauth_client_id()?;

    let state_payload = format!("{}|{:x}", return_to, Utc::now().timestamp_millis());
    let oauth_state = URL_SAFE_NO_PAD.encode(state_payload.as_bytes());

    let separator = if config.oauth_authorize_url.contains('?') {
        '&'
    } else {
        '?'
    };

    let url = format!(
        "{}{}client_id={}&\
         redirect_uri={}&\
         response_type=code&\
         scope={}&\
         state={}",
        config.oauth_authorize_url,
        separator,
        urlencoding::encode(client_id),
        urlencoding::encode(&config.oauth_redirect_uri),
        urlencoding::encode(OAUTH_SCOPE),
        oauth_state
    );

    tracing::info!(return_to, "Starting OAuth redirect flow");
    Ok(url)
}

/// Decode the view path carried in an OAuth `state` parameter.
pub fn decode_state(state: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Timestamp is the last field; the path itself may not contain '|'
    let (return_to, timestamp) = state_str.rsplit_once('|')?;
    u64::from_str_radix(timestamp, 16).ok()?;

    // Only local view paths, never another origin
    if return_to.starts_with('/') && !return_to.starts_with("//") {
        Some(return_to.to_string())
    } else {
        None
    }
}

/// Query parameters delivered to the callback view.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parse a full callback URL, a path with query, or a bare query string.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let absolute = if input.contains("://") {
            input.to_string()
        } else if input.starts_with('/') {
            format!("http://callback{}", input)
        } else {
            format!("http://callback/?{}", input.trim_start_matches('?'))
        };

        let url = Url::parse(&absolute)
            .map_err(|e| ClientError::OAuth(format!("Invalid callback URL: {}", e)))?;

        let mut params = CallbackParams::default();
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        Ok(params)
    }
}

/// Complete the redirect sign-in.
///
/// Returns the view to navigate to. Without a `code` no network call is made.
pub async fn handle_callback(session: &Session, input: &str) -> Result<String> {
    let params = CallbackParams::parse(input)?;

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth provider returned an error");
        return Err(ClientError::OAuth(format!("Authentication failed: {}", error)));
    }

    if params.code.is_none() {
        return Err(ClientError::OAuth(
            "Authentication failed: No code parameter found".to_string(),
        ));
    }

    if !session.refresh_session().await {
        tracing::warn!("Session refresh after OAuth callback failed");
        return Err(ClientError::OAuth(
            "Authentication failed. Please try again.".to_string(),
        ));
    }

    let next = params
        .state
        .as_deref()
        .and_then(decode_state)
        .unwrap_or_else(|| DASHBOARD_PATH.to_string());

    tracing::info!(next = %next, "OAuth sign-in complete");
    Ok(next)
}
