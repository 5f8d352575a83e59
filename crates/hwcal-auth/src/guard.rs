//! Identity gate for admin-only operations.

use std::sync::Arc;

use hwcal_core::{AccessTokenSource, AuthError, Listeners, Subscription};
use parking_lot::{Mutex, RwLock};
use tracing::instrument;

use crate::provider::{AuthChange, AuthProvider, Session, User};

#[derive(Default)]
struct GuardState {
    session: Option<Session>,
    /// Whether the provider's current session has been looked up yet
    resolved: bool,
}

struct GuardInner {
    provider: Arc<dyn AuthProvider>,
    state: RwLock<GuardState>,
    listeners: Listeners<Option<User>>,
    upstream: Mutex<Option<Subscription>>,
}

impl GuardInner {
    fn identity(&self) -> Option<User> {
        self.expire_stale();
        self.state.read().session.as_ref().map(|s| s.user.clone())
    }

    /// Drop the session once its token has expired. Returns true if it did.
    fn expire_stale(&self) -> bool {
        let expired = {
            let mut state = self.state.write();
            if state.session.as_ref().is_some_and(Session::is_expired) {
                state.session = None;
                true
            } else {
                false
            }
        };

        if expired {
            tracing::info!("Session token expired; identity cleared");
            self.listeners.emit(&None);
        }
        expired
    }

    /// Record `session` and notify listeners if the identity changed.
    fn apply(&self, session: Option<Session>) {
        let identity = session.as_ref().map(|s| s.user.clone());

        let changed = {
            let mut state = self.state.write();
            let previous = state.session.as_ref().map(|s| &s.user);
            let changed = !state.resolved || previous != identity.as_ref();
            state.session = session;
            state.resolved = true;
            changed
        };

        if changed {
            match &identity {
                Some(user) => tracing::info!("Session identity is now {}", user.id),
                None => tracing::info!("Session identity cleared"),
            }
            self.listeners.emit(&identity);
        }
    }
}

/// Tracks whether someone is signed in.
///
/// Cloning is cheap; clones share state. The provider subscription is held
/// between [`SessionGuard::activate`] and [`SessionGuard::deactivate`] (or
/// until the last clone is dropped).
#[derive(Clone)]
pub struct SessionGuard {
    inner: Arc<GuardInner>,
}

impl SessionGuard {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            inner: Arc::new(GuardInner {
                provider,
                state: RwLock::new(GuardState::default()),
                listeners: Listeners::new(),
                upstream: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to provider transitions and resolve the current session once.
    ///
    /// Calling this while already active does nothing.
    #[instrument(skip(self), level = "debug")]
    pub async fn activate(&self) {
        {
            let mut upstream = self.inner.upstream.lock();
            if upstream.is_some() {
                return;
            }

            let weak = Arc::downgrade(&self.inner);
            *upstream = Some(self.inner.provider.subscribe(Box::new(
                move |change: &AuthChange| {
                    if let Some(inner) = weak.upgrade() {
                        inner.apply(change.session.clone());
                    }
                },
            )));
        }

        let session = self.inner.provider.current_session().await;
        self.inner.apply(session);
    }

    /// Release the provider subscription.
    pub fn deactivate(&self) {
        let upstream = self.inner.upstream.lock().take();
        if upstream.is_some() {
            tracing::debug!("Session guard detached from provider");
        }
        drop(upstream);
    }

    pub fn is_active(&self) -> bool {
        self.inner.upstream.lock().is_some()
    }

    /// False until the first session lookup completes.
    pub fn is_resolved(&self) -> bool {
        self.inner.state.read().resolved
    }

    pub fn identity(&self) -> Option<User> {
        self.inner.identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.identity().is_some()
    }

    /// The signed-in user, or why there is none.
    ///
    /// A session whose token has expired is dropped here and reported as
    /// [`AuthError::SessionExpired`]; listeners see the identity clear.
    pub fn require_session(&self) -> Result<User, AuthError> {
        if self.inner.expire_stale() {
            return Err(AuthError::SessionExpired);
        }
        self.inner.identity().ok_or(AuthError::NotAuthenticated)
    }

    /// Invoke `callback` with the current identity now (once resolved) and on
    /// every later identity change.
    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Option<User>) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let forward = callback.clone();
        let subscription = self.inner.listeners.subscribe(move |identity| forward(identity));

        if self.is_resolved() {
            callback(&self.identity());
        }
        subscription
    }

    /// Sign in through the provider. Identity is untouched on failure.
    #[instrument(skip(self, password), level = "info")]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let session = self.inner.provider.sign_in(email, password).await?;
        let user = session.user.clone();
        self.inner.apply(Some(session));
        Ok(user)
    }

    /// Clear the local identity, then sign out remotely.
    ///
    /// The identity stays cleared even when the provider reports an error.
    #[instrument(skip(self), level = "info")]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.inner.apply(None);
        self.inner.provider.sign_out().await.map_err(|e| {
            tracing::warn!("Provider sign-out failed: {}", e);
            e
        })
    }
}

impl AccessTokenSource for SessionGuard {
    fn access_token(&self) -> Option<String> {
        self.inner.expire_stale();
        self.inner
            .state
            .read()
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }
}
