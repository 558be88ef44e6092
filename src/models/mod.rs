// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models exchanged with the inventory backend.

pub mod envelope;
pub mod inventory;
pub mod stats;
pub mod user;

pub use envelope::Envelope;
pub use inventory::{Category, CategoryInput, Product, ProductFilters, ProductInput, Sale, SaleInput};
pub use stats::{CategoryShare, DashboardStats, LowStockBar};
pub use user::{AuthPayload, ProfileUpdate, RegisterRequest, Role, User};
