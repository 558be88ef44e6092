// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session continuity and backend access.

pub mod api;
pub mod inventory;
pub mod oauth;
pub mod session;
pub mod token_store;
pub mod users;

pub use api::{ApiClient, ApiRequest, Renewal};
pub use inventory::InventoryService;
pub use session::{Session, StartupOutcome};
pub use token_store::{CredentialStorage, FileStorage, MemoryStorage, TokenStore};
pub use users::UserAdminService;
