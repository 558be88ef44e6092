// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guard: admits or redirects a view request based on session state.

use crate::models::User;
use crate::routes::{Access, Route, DASHBOARD_PATH, LOGIN_PATH, ROOT_PATH};
use crate::state::SessionState;

/// Outcome of guarding a view request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Render the view
    Render(Route),
    /// Navigate to another path instead
    Redirect(&'static str),
    /// Startup check still running; show a loading indicator
    Pending,
}

/// Decide what to show for `path`. Pure; never mutates the session.
pub fn admit(state: &SessionState, path: &str) -> Admission {
    let Some(route) = Route::match_path(path) else {
        return Admission::Redirect(ROOT_PATH);
    };

    match route.access() {
        Access::Root => {
            if state.initializing {
                Admission::Pending
            } else if state.authenticated {
                Admission::Redirect(DASHBOARD_PATH)
            } else {
                Admission::Redirect(LOGIN_PATH)
            }
        }
        Access::Public {
            leave_when_authenticated,
        } => {
            if leave_when_authenticated && state.authenticated {
                Admission::Redirect(DASHBOARD_PATH)
            } else {
                Admission::Render(route)
            }
        }
        Access::Private => match require_auth(state) {
            Ok(_) => Admission::Render(route),
            Err(other) => other,
        },
        Access::Admin => match require_admin(state) {
            Ok(_) => Admission::Render(route),
            Err(other) => other,
        },
    }
}

/// Require an authenticated session; yields the current user.
pub fn require_auth(state: &SessionState) -> Result<&User, Admission> {
    if state.initializing {
        return Err(Admission::Pending);
    }
    match (&state.current_user, state.authenticated) {
        (Some(user), true) => Ok(user),
        _ => Err(Admission::Redirect(LOGIN_PATH)),
    }
}

/// Require an authenticated admin session.
pub fn require_admin(state: &SessionState) -> Result<&User, Admission> {
    let user = require_auth(state)?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(Admission::Redirect(DASHBOARD_PATH))
    }
}
