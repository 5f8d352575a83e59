//! Auth backend: sign-in, sign-out and session activation off the caller's
//! thread. Results are sent back over a channel.

use hwcal_auth::{SessionGuard, User};
use hwcal_core::AuthError;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

/// Messages sent from async operations back to the model
#[derive(Debug)]
pub enum AuthServiceMessage {
    /// Identity transition observed by the session guard
    SessionChanged(Option<User>),
    /// The guard finished resolving the current session
    Activated,
    SignInDone(Result<User, AuthError>),
    SignOutDone(Result<(), AuthError>),
}

/// Resolve the current session. Sends `Activated` once done.
pub fn request_activate(
    tx: &UnboundedSender<AuthServiceMessage>,
    runtime: &Handle,
    guard: SessionGuard,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        guard.activate().await;
        let _ = tx.send(AuthServiceMessage::Activated);
    });
}

pub fn request_sign_in(
    tx: &UnboundedSender<AuthServiceMessage>,
    runtime: &Handle,
    guard: SessionGuard,
    email: String,
    password: String,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = guard.sign_in(&email, &password).await;
        let _ = tx.send(AuthServiceMessage::SignInDone(result));
    });
}

pub fn request_sign_out(
    tx: &UnboundedSender<AuthServiceMessage>,
    runtime: &Handle,
    guard: SessionGuard,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = guard.sign_out().await;
        let _ = tx.send(AuthServiceMessage::SignOutDone(result));
    });
}
