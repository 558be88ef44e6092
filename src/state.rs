// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication state shared by the request pipeline, the session and
//! the views.
//!
//! `SessionStore` is the single owner of the state. Views read snapshots or
//! subscribe to changes; only the session and the pipeline mutate it.

use crate::models::User;
use tokio::sync::watch;

/// Point-in-time view of the authentication state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub authenticated: bool,
    pub current_user: Option<User>,
    /// True only until the startup check completes
    pub initializing: bool,
}

impl SessionState {
    fn initial() -> Self {
        Self {
            authenticated: false,
            current_user: None,
            initializing: true,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.authenticated && self.current_user.as_ref().is_some_and(User::is_admin)
    }
}

/// Owner of the authentication state.
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::initial());
        Self { tx }
    }

    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub(crate) fn authenticate(&self, user: User) {
        self.tx.send_modify(|s| {
            s.authenticated = true;
            s.current_user = Some(user);
        });
    }

    /// Replace the cached profile of an authenticated session.
    pub(crate) fn replace_user(&self, user: User) -> bool {
        self.tx.send_if_modified(|s| {
            if !s.authenticated {
                return false;
            }
            s.current_user = Some(user);
            true
        })
    }

    pub(crate) fn sign_out(&self) {
        self.tx.send_if_modified(|s| {
            let changed = s.authenticated || s.current_user.is_some();
            s.authenticated = false;
            s.current_user = None;
            changed
        });
    }

    /// Clear the initializing flag. Returns `false` if it was already clear.
    pub(crate) fn finish_initializing(&self) -> bool {
        self.tx.send_if_modified(|s| std::mem::replace(&mut s.initializing, false))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
