// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use parla_app::User;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::Client;
use crate::token::TokenStorage;

/// Sentinel token for development; never sent to a real backend for
/// verification and never cleared by unauthorized handling.
pub const MOCK_TOKEN: &str = "mock-token-123";

/// OAuth state marker so the callback can tell this client apart.
const SIGN_IN_STATE: &str = "auth:cli";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
        }
    }
}

/// Shared observable auth flag; mutated only by session operations and the
/// client's unauthorized handler.
#[derive(Debug, Clone, Default)]
pub struct AuthStore {
    state: Arc<Mutex<AuthState>>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> AuthState {
        match self.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, is_authenticated: bool, is_loading: bool) {
        let next = AuthState {
            is_authenticated,
            is_loading,
        };
        match self.state.lock() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

/// Session bootstrap over a token storage and the shared auth store.
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn TokenStorage>,
    store: AuthStore,
}

impl Session {
    pub fn new(storage: Arc<dyn TokenStorage>, store: AuthStore) -> Self {
        Self { storage, store }
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    /// Storage-only bootstrap: a present token counts as authenticated until
    /// verification says otherwise. No network.
    pub fn hydrate(&self) -> bool {
        let token = self.storage.get();
        log::debug!("hydrating auth state, token found: {}", token.is_some());
        let found = token.is_some();
        self.store.set(found, false);
        found
    }

    /// Network verification of the stored token. The mock sentinel
    /// short-circuits to the fixed mock user. Any failure resolves to an
    /// unauthenticated state rather than an error.
    pub fn verify(&self, client: &Client) -> Option<User> {
        if self.storage.get().as_deref() == Some(MOCK_TOKEN) {
            log::debug!("mock token present, skipping verification");
            self.store.set(true, false);
            return Some(crate::mock::mock_user());
        }

        match client.current_user() {
            Ok(user) => {
                log::debug!("verification succeeded for {}", user.id);
                self.store.set(true, false);
                Some(user)
            }
            Err(error) => {
                log::debug!("verification failed: {error:#}");
                self.store.set(false, false);
                None
            }
        }
    }

    pub fn mock_login(&self) {
        log::info!("performing mock login");
        self.storage.set(MOCK_TOKEN);
        self.store.set(true, false);
    }

    pub fn login(&self, token: &str) {
        self.storage.set(token);
        self.store.set(true, false);
    }

    pub fn logout(&self) {
        self.storage.clear();
        self.store.set(false, false);
    }
}

/// Google OAuth URL carrying the callback and a state marker. Missing
/// configuration is an error so the caller can reset its loading state
/// instead of navigating nowhere.
pub fn sign_in_url(google_auth_url: &str, redirect_uri: &str) -> Result<String> {
    if google_auth_url.trim().is_empty() {
        bail!("auth.google_auth_url is not configured");
    }
    if redirect_uri.trim().is_empty() {
        bail!("auth.redirect_uri is not configured");
    }

    let mut url = Url::parse(google_auth_url).context("parse auth.google_auth_url")?;
    url.query_pairs_mut()
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("state", SIGN_IN_STATE);
    Ok(url.into())
}
