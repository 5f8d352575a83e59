pub mod config;
pub mod error;
pub mod subscription;
pub mod theme;

pub use config::{CalendarConfig, Config, NotificationConfig, StoreConfig, ValidationResult};
pub use error::{
    AppError, AuthError, ConfigError, ReqwestErrorExt, StoreError, ValidationError,
};
pub use subscription::{Listeners, Subscription};
pub use theme::{Theme, ThemeStore};

use anyhow::Result;

/// Something that can hand out the bearer token for the signed-in user.
///
/// Implemented by the session guard and consumed by the store client so the
/// two crates stay independent of each other.
pub trait AccessTokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Initialize logging for the process.
pub fn init() -> Result<()> {
    // Repeated calls (tests, embedders) keep the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    tracing::info!("Homework calendar core initialized");
    Ok(())
}
