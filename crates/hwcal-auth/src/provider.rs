use async_trait::async_trait;
use hwcal_core::{AuthError, Subscription};
use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,

    /// Bearer token for store requests
    pub access_token: String,

    pub refresh_token: Option<String>,

    /// Expiration timestamp (Unix seconds)
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

/// A session transition broadcast to provider listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl AuthChange {
    pub fn signed_in(session: Session) -> Self {
        Self {
            event: AuthEvent::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            event: AuthEvent::SignedOut,
            session: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }
}

pub type AuthListener = Box<dyn Fn(&AuthChange) + Send + Sync>;

/// External authentication capability.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Ends the session. Local state is cleared even when this returns an error.
    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn current_session(&self) -> Option<Session>;

    /// Called on every session transition until the handle is released.
    fn subscribe(&self, listener: AuthListener) -> Subscription;
}
