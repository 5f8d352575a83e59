//! Application services container.
//!
//! Owns the tokio runtime and the shared collaborators (entry store, session
//! guard, dialog host, theme sources), and builds view models wired to them.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use hwcal_auth::{AuthProvider, PasswordAuth, SessionGuard};
use hwcal_calendar::YearRange;
use hwcal_core::{Config, ThemeStore};
use hwcal_store::{EntryStore, HomeworkClient};

use crate::models::{AdminModel, HomeModel, ListenerHost, ManualSystemTheme, ThemeModel};

pub struct AppServices {
    /// Tokio runtime for async operations
    runtime: tokio::runtime::Runtime,

    config: Config,

    store: Arc<dyn EntryStore>,

    guard: SessionGuard,

    /// Outside-click and key input for dialogs
    dialog_host: Arc<ListenerHost>,

    /// Terminals expose no color-scheme preference; starts light
    system_theme: Arc<ManualSystemTheme>,
}

impl AppServices {
    /// Build the services against the configured backend.
    pub fn new(config: Config) -> Result<Self> {
        let auth: Arc<dyn AuthProvider> =
            Arc::new(PasswordAuth::new(&config).context("Failed to create auth client")?);
        let guard = SessionGuard::new(auth);

        let client = HomeworkClient::new(&config.store)
            .context("Failed to create store client")?
            .with_token_source(Arc::new(guard.clone()));

        Self::with_parts(config, Arc::new(client), guard)
    }

    /// Build the services around an existing store and guard.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn EntryStore>,
        guard: SessionGuard,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("hwcal-tokio")
            .build()
            .context("Failed to create tokio runtime")?;

        tracing::info!("AppServices initialized (store: {})", config.store.url);

        Ok(Self {
            runtime,
            config,
            store,
            guard,
            dialog_host: Arc::new(ListenerHost::new()),
            system_theme: Arc::new(ManualSystemTheme::new(false)),
        })
    }

    /// Get the tokio runtime handle.
    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Drive a future to completion on the runtime.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn EntryStore> {
        self.store.clone()
    }

    pub fn guard(&self) -> SessionGuard {
        self.guard.clone()
    }

    pub fn dialog_host(&self) -> Arc<ListenerHost> {
        self.dialog_host.clone()
    }

    pub fn system_theme(&self) -> Arc<ManualSystemTheme> {
        self.system_theme.clone()
    }

    fn year_range(&self) -> YearRange {
        YearRange::from_config(&self.config.calendar)
    }

    pub fn home_model(&self, today: NaiveDate) -> HomeModel {
        HomeModel::new(self.store(), self.runtime(), self.year_range(), today)
    }

    pub fn admin_model(&self, today: NaiveDate) -> AdminModel {
        AdminModel::new(
            self.store(),
            self.guard(),
            self.dialog_host.clone(),
            self.runtime(),
            self.year_range(),
            today,
            Duration::from_millis(self.config.notifications.duration_ms),
        )
    }

    pub fn theme_model(&self) -> ThemeModel {
        ThemeModel::new(
            ThemeStore::new(self.config.theme_path()),
            self.system_theme.as_ref(),
        )
    }

    /// Detach from the auth provider.
    pub fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");
        self.guard.deactivate();
        tracing::info!("AppServices shutdown complete");
    }
}
