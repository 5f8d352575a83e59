//! Admin calendar view: everything the public view shows, plus sign-in and
//! entry editing.
//!
//! Async results come back over two channels (entry store and auth) and are
//! applied by [`AdminModel::poll_channel`] or [`AdminModel::settle`].

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use hwcal_auth::{SessionGuard, User};
use hwcal_calendar::YearRange;
use hwcal_core::{AppError, AuthError, Subscription, ValidationError};
use hwcal_store::{Entry, EntryStore, EntryUpdate, NewEntry};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::calendar_view::{CalendarView, Refresh};
use super::entry_dialog::{DialogHost, EntryDialog};
use super::feed::CalendarFeed;
use crate::notification::NotificationQueue;
use crate::services::{
    request_activate, request_create, request_delete, request_sign_in, request_sign_out,
    request_update, AuthServiceMessage, EntryServiceMessage,
};

pub const MSG_SIGNED_IN: &str = "Signed in successfully";
pub const MSG_SIGNED_OUT: &str = "Signed out";
pub const MSG_SIGN_OUT_UNCONFIRMED: &str =
    "Signed out on this device, but the sign-in service did not confirm";
pub const MSG_ENTRY_ADDED: &str = "Entry added";
pub const MSG_ADD_FAILED: &str = "Failed to add entry";
pub const MSG_ENTRY_UPDATED: &str = "Entry updated";
pub const MSG_UPDATE_FAILED: &str = "Failed to update entry";
pub const MSG_ENTRY_DELETED: &str = "Entry deleted";
pub const MSG_DELETE_FAILED: &str = "Failed to delete entry";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this entry?";

/// Login form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub loading: bool,
    /// Shown inline under the form
    pub error: Option<String>,
}

enum Incoming {
    Entry(EntryServiceMessage),
    Auth(AuthServiceMessage),
}

pub struct AdminModel {
    feed: CalendarFeed,
    guard: SessionGuard,
    runtime: Handle,
    notifications: NotificationQueue,
    host: Arc<dyn DialogHost>,
    dialog: EntryDialog,
    auth_tx: UnboundedSender<AuthServiceMessage>,
    auth_rx: UnboundedReceiver<AuthServiceMessage>,
    auth_in_flight: usize,
    session_sub: Option<Subscription>,
    identity: Option<User>,
    auth_checked: bool,
    login: LoginForm,
    pending_delete: Option<Entry>,
}

impl AdminModel {
    pub fn new(
        store: Arc<dyn EntryStore>,
        guard: SessionGuard,
        host: Arc<dyn DialogHost>,
        runtime: Handle,
        range: YearRange,
        today: NaiveDate,
        notification_duration: Duration,
    ) -> Self {
        let (auth_tx, auth_rx) = mpsc::unbounded_channel();
        Self {
            feed: CalendarFeed::new(CalendarView::new(range, today), store, runtime.clone()),
            guard,
            notifications: NotificationQueue::new(notification_duration, runtime.clone()),
            runtime,
            host,
            dialog: EntryDialog::new(today),
            auth_tx,
            auth_rx,
            auth_in_flight: 0,
            session_sub: None,
            identity: None,
            auth_checked: false,
            login: LoginForm::default(),
            pending_delete: None,
        }
    }

    pub fn view(&self) -> &CalendarView {
        self.feed.view()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn dialog(&self) -> &EntryDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut EntryDialog {
        &mut self.dialog
    }

    pub fn login(&self) -> &LoginForm {
        &self.login
    }

    pub fn identity(&self) -> Option<&User> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// True until the first session lookup has been applied.
    pub fn is_auth_pending(&self) -> bool {
        !self.auth_checked
    }

    pub fn pending_delete(&self) -> Option<&Entry> {
        self.pending_delete.as_ref()
    }

    // -- lifecycle --

    /// Start listening for session transitions and resolve the current session.
    pub fn activate(&mut self) {
        if self.session_sub.is_some() {
            return;
        }
        tracing::debug!("Admin view activated");

        let tx = self.auth_tx.clone();
        self.session_sub = Some(self.guard.subscribe(move |identity| {
            let _ = tx.send(AuthServiceMessage::SessionChanged(identity.clone()));
        }));

        self.auth_in_flight += 1;
        request_activate(&self.auth_tx, &self.runtime, self.guard.clone());
    }

    /// Release every listener the view holds.
    pub fn deactivate(&mut self) {
        if self.session_sub.take().is_some() {
            tracing::debug!("Admin view deactivated");
        }
        self.dialog.close();
        self.pending_delete = None;
        self.guard.deactivate();
    }

    // -- session --

    pub fn set_email(&mut self, email: &str) {
        self.login.email = email.to_string();
    }

    pub fn set_password(&mut self, password: &str) {
        self.login.password = password.to_string();
    }

    /// Submit the login form. Empty fields are rejected without a request.
    pub fn sign_in(&mut self) -> Result<(), ValidationError> {
        if self.login.loading {
            return Ok(());
        }

        let email = self.login.email.trim().to_string();
        let missing = if email.is_empty() {
            Some("email")
        } else if self.login.password.is_empty() {
            Some("password")
        } else {
            None
        };
        if let Some(field) = missing {
            let err = ValidationError::MissingField(field);
            self.login.error = Some(err.user_message().to_string());
            return Err(err);
        }

        self.login.loading = true;
        self.login.error = None;
        self.auth_in_flight += 1;
        request_sign_in(
            &self.auth_tx,
            &self.runtime,
            self.guard.clone(),
            email,
            self.login.password.clone(),
        );
        Ok(())
    }

    /// Sign out. Admin data is dropped right away, whatever the provider says.
    pub fn sign_out(&mut self) {
        self.apply_identity(None);
        self.auth_in_flight += 1;
        request_sign_out(&self.auth_tx, &self.runtime, self.guard.clone());
    }

    fn apply_identity(&mut self, identity: Option<User>) {
        self.auth_checked = true;
        if self.identity == identity {
            return;
        }

        let signed_in = identity.is_some();
        self.identity = identity;
        if signed_in {
            self.feed.update(CalendarView::refresh_all);
        } else {
            self.feed.update_local(CalendarView::clear);
            self.dialog.close();
            self.pending_delete = None;
        }
    }

    /// Confirm the session is still usable, dropping admin data if its token
    /// has expired.
    fn check_expiry(&mut self) -> Result<(), AuthError> {
        if self.identity.is_none() {
            return Err(AuthError::NotAuthenticated);
        }

        self.guard
            .require_session()
            .map(|_| ())
            .map_err(|e| self.session_lost(e))
    }

    fn session_lost(&mut self, e: AuthError) -> AuthError {
        tracing::warn!("Session no longer usable: {}", e);
        self.apply_identity(None);
        if e == AuthError::SessionExpired {
            self.notifications.error(e.user_message());
        }
        e
    }

    fn require_session(&mut self) -> Result<(), AppError> {
        Ok(self.check_expiry()?)
    }

    // -- navigation --

    fn navigate<F>(&mut self, transition: F)
    where
        F: FnOnce(&mut CalendarView) -> Vec<Refresh>,
    {
        let refreshes = self.feed.update_local(transition);
        // Signed-out views show no data, so there is nothing to fetch
        if self.is_authenticated() {
            self.feed.run(refreshes);
        }
        self.dialog.sync_date(self.feed.view().selected());
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.navigate(|view| view.select_date(date));
    }

    pub fn step_prev(&mut self) {
        self.navigate(CalendarView::step_prev);
    }

    pub fn step_next(&mut self) {
        self.navigate(CalendarView::step_next);
    }

    pub fn set_month(&mut self, month: i32) -> Result<(), ValidationError> {
        let refreshes = self.feed.update_local(|view| view.set_month(month))?;
        self.navigate(|_| refreshes);
        Ok(())
    }

    pub fn set_year(&mut self, year: i32) -> Result<(), ValidationError> {
        let refreshes = self.feed.update_local(|view| view.set_year(year))?;
        self.navigate(|_| refreshes);
        Ok(())
    }

    pub fn jump_to_today(&mut self, today: NaiveDate) {
        self.navigate(|view| view.jump_to_today(today));
    }

    // -- entries --

    /// Open the create-entry dialog. Only available while signed in.
    pub fn open_dialog(&mut self) -> bool {
        if self.check_expiry().is_err() {
            return false;
        }
        self.dialog.sync_date(self.feed.view().selected());
        self.dialog.open(self.host.as_ref());
        true
    }

    pub fn close_dialog(&mut self) {
        self.dialog.close();
    }

    /// Validate the dialog and create the entry.
    pub fn submit_dialog(&mut self) -> Result<(), AppError> {
        self.require_session()?;
        if self.dialog.is_submitting() {
            return Ok(());
        }

        let entry = self.dialog.submit().map_err(|e| {
            self.notifications.error(e.user_message());
            e
        })?;
        self.create_entry(entry)
    }

    pub fn create_entry(&mut self, entry: NewEntry) -> Result<(), AppError> {
        self.require_session()?;
        let (tx, runtime, store) = self.feed.begin_request();
        request_create(tx, runtime, store, entry);
        Ok(())
    }

    /// Edit an entry's subject and task.
    pub fn update_entry(&mut self, id: &str, subject: &str, task: &str) -> Result<(), AppError> {
        self.require_session()?;
        let update = EntryUpdate::content(subject, task).map_err(|e| {
            self.notifications.error(e.user_message());
            e
        })?;

        let (tx, runtime, store) = self.feed.begin_request();
        request_update(tx, runtime, store, id.to_string(), update);
        Ok(())
    }

    /// Ask for confirmation before deleting. Nothing is sent to the store yet.
    pub fn request_delete(&mut self, id: &str) -> bool {
        if self.check_expiry().is_err() {
            return false;
        }
        match self.feed.view().entry(id) {
            Some(entry) => {
                self.pending_delete = Some(entry.clone());
                true
            }
            None => false,
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the entry awaiting confirmation.
    pub fn confirm_delete(&mut self) -> bool {
        let Some(entry) = self.pending_delete.take() else {
            return false;
        };
        if self.check_expiry().is_err() {
            return false;
        }

        let (tx, runtime, store) = self.feed.begin_request();
        request_delete(tx, runtime, store, entry.id);
        true
    }

    // -- results --

    fn handle_entry_message(&mut self, msg: EntryServiceMessage) {
        let Some(msg) = self.feed.apply(msg) else {
            return;
        };

        if !self.is_authenticated() {
            tracing::debug!("Ignoring mutation result while signed out: {:?}", msg);
            return;
        }

        match msg {
            EntryServiceMessage::Created(Ok(entry)) => {
                tracing::info!("Entry {} added for {}", entry.id, entry.homework_date);
                self.feed.update(|view| {
                    view.insert_entry(entry);
                    vec![view.refresh_dates()]
                });
                // Entries created outside the dialog leave its draft alone
                if self.dialog.is_submitting() {
                    let selected = self.feed.view().selected();
                    self.dialog.finish_success(selected);
                }
                self.notifications.success(MSG_ENTRY_ADDED);
            }
            EntryServiceMessage::Created(Err(e)) => {
                tracing::error!("Failed to add entry: {}", e);
                self.dialog.finish_failure();
                self.notifications.error(MSG_ADD_FAILED);
            }
            EntryServiceMessage::Updated { id, result: Ok(entry) } => {
                tracing::info!("Entry {} updated", id);
                self.feed.update(|view| {
                    if view.replace_entry(entry) {
                        vec![view.refresh_dates()]
                    } else {
                        Vec::new()
                    }
                });
                self.notifications.success(MSG_ENTRY_UPDATED);
            }
            EntryServiceMessage::Updated { id, result: Err(e) } => {
                tracing::error!("Failed to update entry {}: {}", id, e);
                self.notifications.error(MSG_UPDATE_FAILED);
            }
            EntryServiceMessage::Deleted { id, result: Ok(()) } => {
                tracing::info!("Entry {} deleted", id);
                self.feed.update(|view| {
                    view.remove_entry(&id);
                    vec![view.refresh_dates()]
                });
                self.notifications.success(MSG_ENTRY_DELETED);
            }
            EntryServiceMessage::Deleted { id, result: Err(e) } => {
                tracing::error!("Failed to delete entry {}: {}", id, e);
                self.notifications.error(MSG_DELETE_FAILED);
            }
            EntryServiceMessage::EntriesLoaded { .. }
            | EntryServiceMessage::DatesLoaded { .. } => {}
        }
    }

    fn handle_auth_message(&mut self, msg: AuthServiceMessage) {
        if !matches!(msg, AuthServiceMessage::SessionChanged(_)) {
            self.auth_in_flight = self.auth_in_flight.saturating_sub(1);
        }

        match msg {
            AuthServiceMessage::SessionChanged(identity) => self.apply_identity(identity),
            AuthServiceMessage::Activated => {
                self.auth_checked = true;
            }
            AuthServiceMessage::SignInDone(Ok(user)) => {
                self.login.loading = false;
                self.login.password.clear();
                self.login.error = None;
                // The token may already be unusable by the time the result lands
                match self.guard.require_session() {
                    Ok(_) => {
                        self.apply_identity(Some(user));
                        self.notifications.success(MSG_SIGNED_IN);
                    }
                    Err(e) => {
                        self.session_lost(e);
                    }
                }
            }
            AuthServiceMessage::SignInDone(Err(e)) => {
                tracing::warn!("Sign-in failed: {}", e);
                self.login.loading = false;
                self.login.error = Some(e.user_message().to_string());
            }
            AuthServiceMessage::SignOutDone(Ok(())) => {
                self.notifications.success(MSG_SIGNED_OUT);
            }
            AuthServiceMessage::SignOutDone(Err(e)) => {
                tracing::warn!("Provider sign-out failed: {}", e);
                self.notifications.info(MSG_SIGN_OUT_UNCONFIRMED);
            }
        }
    }

    /// Apply everything that has already arrived. Never blocks.
    pub fn poll_channel(&mut self) {
        if self.identity.is_some() {
            let _ = self.check_expiry();
        }
        while let Ok(msg) = self.auth_rx.try_recv() {
            self.handle_auth_message(msg);
        }
        while let Some(msg) = self.feed.try_next() {
            self.handle_entry_message(msg);
        }
        self.dialog.poll_events();
    }

    /// Wait until no request is in flight.
    pub async fn settle(&mut self) {
        loop {
            self.poll_channel();

            let entries_busy = self.feed.in_flight() > 0;
            let auth_busy = self.auth_in_flight > 0;
            if !entries_busy && !auth_busy {
                break;
            }

            let incoming = tokio::select! {
                Some(msg) = self.feed.next(), if entries_busy => Incoming::Entry(msg),
                Some(msg) = self.auth_rx.recv(), if auth_busy => Incoming::Auth(msg),
                else => break,
            };

            match incoming {
                Incoming::Entry(msg) => self.handle_entry_message(msg),
                Incoming::Auth(msg) => self.handle_auth_message(msg),
            }
        }
    }
}

impl Drop for AdminModel {
    fn drop(&mut self) {
        self.deactivate();
    }
}
