// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Inventory client: session continuity for the inventory REST backend
//!
//! This crate keeps a signed-in session alive across restarts and expired
//! access tokens, guards the client views by role, and wraps the inventory
//! and user administration endpoints.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use config::Config;
use error::Result;
use routes::Navigator;
use services::{ApiClient, InventoryService, Session, TokenStore, UserAdminService};
use state::SessionStore;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub session: Session,
    pub inventory: InventoryService,
    pub users: UserAdminService,
}

impl AppState {
    /// Wire the pipeline, session and services around one token store.
    pub fn new(
        config: Config,
        tokens: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let session_store = Arc::new(SessionStore::new());
        let api = Arc::new(ApiClient::new(&config, tokens, session_store, navigator)?);

        Ok(Self {
            session: Session::new(api.clone()),
            inventory: InventoryService::new(api.clone()),
            users: UserAdminService::new(api.clone()),
            api,
            config,
        })
    }
}
