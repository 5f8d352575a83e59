//! Centralized error types for the homework calendar.
//!
//! This module provides a typed error hierarchy that:
//! - Separates client-side validation from auth and store failures
//! - Provides user-friendly messages suitable for UI display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Validation(e) => e.user_message(),
            AppError::Auth(e) => e.user_message(),
            AppError::Store(e) => e.user_message(),
        }
    }
}

/// Client-side input errors. These block submission; no network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("{field} {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "Please fill in all fields.",
            ValidationError::InvalidDate(_) => "Please pick a valid date.",
            ValidationError::OutOfRange { .. } => "That month is outside the supported range.",
        }
    }
}

/// Authentication errors (sign-in, sign-out, session handling).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Auth provider error: {0}")]
    Provider(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password.",
            AuthError::NotAuthenticated => "Please sign in first.",
            AuthError::SessionExpired => "Your session has expired. Please sign in again.",
            AuthError::Provider(_) => "Sign-in failed. Please try again.",
            AuthError::Network(_) => "Unable to reach the sign-in service. Check your connection.",
            AuthError::Storage(_) => "The saved session could not be read. Please sign in again.",
        }
    }
}

/// Remote entry store errors (fetch, create, update, delete).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Network(_) => "Unable to connect. Check your internet connection.",
            StoreError::Timeout => "The request timed out. Please try again.",
            StoreError::Server { .. } => {
                "The server is experiencing issues. Please try again later."
            }
            StoreError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
            StoreError::NotFound(_) => "That entry no longer exists.",
            StoreError::Rejected(_) => "The request was rejected. Please check and try again.",
        }
    }
}

/// Configuration load and validation failures. Raised before any view exists,
/// so these surface through `anyhow` at the binary boundary.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more settings failed validation (summary of all errors)
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The file or an environment override could not be read or deserialized
    #[error("Configuration parse error: {0}")]
    Parse(String),
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_store_error(self) -> StoreError;
    fn into_auth_error(self) -> AuthError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_store_error(self) -> StoreError {
        if self.is_timeout() {
            StoreError::Timeout
        } else if self.is_decode() {
            StoreError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            StoreError::Server {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            StoreError::Network(self.to_string())
        }
    }

    fn into_auth_error(self) -> AuthError {
        if self.is_decode() {
            AuthError::Provider(self.to_string())
        } else {
            AuthError::Network(self.to_string())
        }
    }
}
