// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (route guarding).

pub mod auth;

pub use auth::{admit, require_admin, require_auth, Admission};
