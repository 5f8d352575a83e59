use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory (also holds session and theme files)
    pub config_dir: PathBuf,

    /// Remote entry store
    pub store: StoreConfig,

    /// Calendar range
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Status notifications
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted backend (REST and auth endpoints live below it)
    pub url: String,

    /// Public API key sent with every request (optional, can be set via environment)
    pub anon_key: Option<String>,

    /// Table holding homework entries
    #[serde(default = "default_table")]
    pub table: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_table() -> String {
    "homework".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// First selectable year
    pub base_year: i32,

    /// Number of consecutive selectable years, starting at `base_year`
    pub year_span: u32,
}

impl CalendarConfig {
    /// Last selectable year (inclusive).
    pub fn max_year(&self) -> i32 {
        self.base_year + self.year_span.saturating_sub(1) as i32
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_year: 2024,
            year_span: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a notification stays visible
    pub duration_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { duration_ms: 3000 }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hwcal");

        Self {
            config_dir,
            store: StoreConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: std::env::var("HWCAL_ANON_KEY").ok(),
                table: default_table(),
                timeout_secs: default_timeout_secs(),
            },
            calendar: CalendarConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration layered as defaults, then `path`, then `HWCAL_*` environment
    /// variables (sections separated by `__`, e.g. `HWCAL_STORE__URL`).
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = ConfigBuilder::try_from(&Self::default())
            .context("Failed to build default config")?;

        let settings = ConfigBuilder::builder()
            .add_source(defaults)
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("HWCAL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::check(Self::load()?)
    }

    /// [`Config::load_validated`] against an explicit file.
    pub fn load_validated_from(path: &Path) -> Result<(Self, ValidationResult)> {
        Self::check(Self::load_from(path)?)
    }

    fn check(config: Self) -> Result<(Self, ValidationResult)> {
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.store.url, "store.url", &mut result);

        if self.store.anon_key.as_deref().map_or(true, str::is_empty) {
            result.add_warning(
                "store.anon_key",
                "No API key configured - requests may be rejected",
            );
        }

        if self.store.table.trim().is_empty() {
            result.add_error("store.table", "Table name must not be empty");
        }

        if self.store.timeout_secs == 0 {
            result.add_error("store.timeout_secs", "Timeout must be greater than 0");
        }

        if self.calendar.year_span == 0 {
            result.add_error("calendar.year_span", "At least one year must be selectable");
        }

        if !(1970..=9000).contains(&self.calendar.base_year) {
            result.add_error(
                "calendar.base_year",
                format!("Unsupported base year: {}", self.calendar.base_year),
            );
        }

        if self.notifications.duration_ms == 0 {
            result.add_error(
                "notifications.duration_ms",
                "Notification duration must be greater than 0",
            );
        } else if self.notifications.duration_ms > 60_000 {
            result.add_warning(
                "notifications.duration_ms",
                "Notifications stay visible for more than a minute",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// File holding the persisted session.
    pub fn session_path(&self) -> PathBuf {
        self.config_dir.join("session.json")
    }

    /// File holding the explicit theme choice.
    pub fn theme_path(&self) -> PathBuf {
        self.config_dir.join("theme")
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("hwcal");

        Ok(config_dir.join("config.toml"))
    }
}
