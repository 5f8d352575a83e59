//! Password-grant client for a GoTrue-style auth endpoint.

use std::time::Duration;

use async_trait::async_trait;
use hwcal_core::{AuthError, Config, Listeners, ReqwestErrorExt, Subscription};
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::instrument;

use crate::provider::{AuthChange, AuthListener, AuthProvider, Session, User};
use crate::storage::SessionStorage;

/// Default token lifetime when the endpoint omits both expiry fields
const DEFAULT_EXPIRES_IN: i64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self.expires_at.unwrap_or_else(|| {
            chrono::Utc::now().timestamp() + self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN)
        });

        Session {
            user: self.user,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

pub struct PasswordAuth {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    storage: SessionStorage,
    session: RwLock<Option<Session>>,
    listeners: Listeners<AuthChange>,
}

impl PasswordAuth {
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.store.timeout_secs))
            .build()
            .map_err(ReqwestErrorExt::into_auth_error)?;

        Ok(Self {
            client,
            base_url: config.store.url.trim_end_matches('/').to_string(),
            api_key: config.store.anon_key.clone(),
            storage: SessionStorage::new(config.session_path()),
            session: RwLock::new(None),
            listeners: Listeners::new(),
        })
    }

    pub fn with_base_url(base_url: &str, api_key: Option<&str>, storage: SessionStorage) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            storage,
            session: RwLock::new(None),
            listeners: Listeners::new(),
        }
    }

    fn with_api_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("apikey", key),
            None => req,
        }
    }

    /// Read the persisted session, if any, without checking its expiry.
    pub fn restore(&self) -> Result<Option<Session>, AuthError> {
        self.storage
            .retrieve()
            .map_err(|e| AuthError::Storage(format!("{:#}", e)))
    }

    fn clear_local(&self) -> Option<Session> {
        let previous = self.session.write().take();
        if let Err(e) = self.storage.delete() {
            tracing::warn!("Failed to remove stored session: {}", e);
        }
        previous
    }
}

#[async_trait]
impl AuthProvider for PasswordAuth {
    #[instrument(skip(self, password), level = "info")]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token", self.base_url);

        let response = self
            .with_api_key(self.client.post(&url))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(ReqwestErrorExt::into_auth_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return match status.as_u16() {
                400 | 401 => Err(AuthError::InvalidCredentials),
                _ => Err(AuthError::Provider(format!("{}: {}", status, text))),
            };
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("JSON parse error: {}", e)))?;
        let session = token.into_session();

        // The in-memory session still applies if persisting fails
        if let Err(e) = self.storage.store(&session) {
            tracing::warn!("Failed to persist session: {}", e);
        }
        *self.session.write() = Some(session.clone());

        tracing::info!("Signed in as {}", session.user.id);
        self.listeners.emit(&AuthChange::signed_in(session.clone()));
        Ok(session)
    }

    #[instrument(skip(self), level = "info")]
    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.clear_local();
        self.listeners.emit(&AuthChange::signed_out());

        let Some(session) = previous else {
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .with_api_key(self.client.post(&url))
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_auth_error)?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Signed out {}", session.user.id);
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(AuthError::Provider(format!("{}: {}", status, text)))
        }
    }

    async fn current_session(&self) -> Option<Session> {
        let cached = self.session.read().clone();
        let session = match cached {
            Some(session) => session,
            None => match self.restore() {
                Ok(Some(session)) => session,
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable stored session: {}", e);
                    return None;
                }
            },
        };

        if session.is_expired() {
            tracing::info!("Stored session for {} has expired", session.user.id);
            self.clear_local();
            return None;
        }

        *self.session.write() = Some(session.clone());
        Some(session)
    }

    fn subscribe(&self, listener: AuthListener) -> Subscription {
        self.listeners.subscribe(move |change| listener(change))
    }
}
