// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client view table and navigation.

use std::fmt;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const OAUTH_CALLBACK_PATH: &str = "/auth/google/callback";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const PROFILE_PATH: &str = "/profile";
pub const PRODUCTS_PATH: &str = "/inventory/products";
pub const ADMIN_PATH: &str = "/admin";
pub const ADMIN_USERS_PATH: &str = "/admin/users";

/// Views of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    OAuthCallback,
    Dashboard,
    Profile,
    Products,
    AdminDashboard,
    AdminUsers,
    AdminUserDetail(u64),
}

/// Who may see a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Redirects by session state, renders nothing itself
    Root,
    /// Always rendered; `leave_when_authenticated` views send signed-in users away
    Public { leave_when_authenticated: bool },
    /// Requires a session
    Private,
    /// Requires a session with the admin role
    Admin,
}

impl Route {
    /// Match a path (query string and trailing slash ignored).
    pub fn match_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        let route = match segments.as_slice() {
            [] => Route::Root,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["auth", "google", "callback"] => Route::OAuthCallback,
            ["dashboard"] => Route::Dashboard,
            ["profile"] => Route::Profile,
            ["inventory", "products"] => Route::Products,
            ["admin"] => Route::AdminDashboard,
            ["admin", "users"] => Route::AdminUsers,
            ["admin", "users", id] => Route::AdminUserDetail(id.parse().ok()?),
            _ => return None,
        };

        // Paths must be absolute
        if !path.starts_with('/') {
            return None;
        }

        Some(route)
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Root => Access::Root,
            Route::Login | Route::Register => Access::Public {
                leave_when_authenticated: true,
            },
            Route::OAuthCallback => Access::Public {
                leave_when_authenticated: false,
            },
            Route::Dashboard | Route::Profile | Route::Products => Access::Private,
            Route::AdminDashboard | Route::AdminUsers | Route::AdminUserDetail(_) => Access::Admin,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Root => ROOT_PATH.to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Register => REGISTER_PATH.to_string(),
            Route::OAuthCallback => OAUTH_CALLBACK_PATH.to_string(),
            Route::Dashboard => DASHBOARD_PATH.to_string(),
            Route::Profile => PROFILE_PATH.to_string(),
            Route::Products => PRODUCTS_PATH.to_string(),
            Route::AdminDashboard => ADMIN_PATH.to_string(),
            Route::AdminUsers => ADMIN_USERS_PATH.to_string(),
            Route::AdminUserDetail(id) => format!("{}/{}", ADMIN_USERS_PATH, id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Performs view navigation requested outside a view (forced logout).
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "Navigation requested");
    }
}
