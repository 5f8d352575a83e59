//! In-process auth provider with a fixed set of accounts.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use hwcal_core::{AuthError, Listeners, Subscription};
use parking_lot::RwLock;

use crate::provider::{AuthChange, AuthListener, AuthProvider, Session, User};

const SESSION_LIFETIME_SECS: i64 = 3600;

pub struct MemoryAuth {
    accounts: Vec<(String, String)>,
    session: RwLock<Option<Session>>,
    listeners: Listeners<AuthChange>,
    fail_sign_out: AtomicBool,
    issued: AtomicU64,
    lifetime_secs: i64,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            session: RwLock::new(None),
            listeners: Listeners::new(),
            fail_sign_out: AtomicBool::new(false),
            issued: AtomicU64::new(0),
            lifetime_secs: SESSION_LIFETIME_SECS,
        }
    }

    /// Issue sessions that expire `secs` after sign-in. Zero means already expired.
    pub fn with_session_lifetime(mut self, secs: i64) -> Self {
        self.lifetime_secs = secs;
        self
    }

    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        self.accounts.push((email.to_string(), password.to_string()));
        self
    }

    /// Start out signed in as `email` without broadcasting.
    pub fn signed_in_as(self, email: &str) -> Self {
        let session = self.issue(email);
        *self.session.write() = Some(session);
        self
    }

    /// Make the remote half of `sign_out` fail. Local state is still cleared.
    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Simulate the session ending elsewhere (expiry, another tab).
    pub fn expire(&self) {
        *self.session.write() = None;
        self.listeners.emit(&AuthChange::signed_out());
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn issue(&self, email: &str) -> Session {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Session {
            user: User {
                id: format!("user-{}", email),
                email: Some(email.to_string()),
            },
            access_token: format!("token-{}", n),
            refresh_token: None,
            expires_at: chrono::Utc::now().timestamp() + self.lifetime_secs,
        }
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let known = self
            .accounts
            .iter()
            .any(|(e, p)| e == email && p == password);
        if !known {
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue(email);
        *self.session.write() = Some(session.clone());
        self.listeners.emit(&AuthChange::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.session.write() = None;
        self.listeners.emit(&AuthChange::signed_out());

        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Network("connection reset".to_string()));
        }
        Ok(())
    }

    async fn current_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    fn subscribe(&self, listener: AuthListener) -> Subscription {
        self.listeners.subscribe(move |change| listener(change))
    }
}
