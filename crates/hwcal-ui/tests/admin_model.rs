mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use common::{date, entry, range, Call, ScriptedStore};
use hwcal_auth::{MemoryAuth, SessionGuard};
use hwcal_core::{AppError, AuthError, ValidationError};
use hwcal_ui::models::admin_model::{
    MSG_ADD_FAILED, MSG_DELETE_FAILED, MSG_ENTRY_ADDED, MSG_ENTRY_DELETED, MSG_ENTRY_UPDATED,
    MSG_SIGNED_IN, MSG_SIGNED_OUT, MSG_SIGN_OUT_UNCONFIRMED, MSG_UPDATE_FAILED,
};
use hwcal_ui::{AdminModel, ListenerHost, NotificationKind};
use tokio::runtime::Handle;

const EMAIL: &str = "tutor@school.test";
const PASSWORD: &str = "correct horse";

struct Fixture {
    store: Arc<ScriptedStore>,
    auth: Arc<MemoryAuth>,
    host: Arc<ListenerHost>,
    model: AdminModel,
}

fn fixture(store: ScriptedStore, auth: MemoryAuth, today: NaiveDate) -> Fixture {
    let store = Arc::new(store);
    let auth = Arc::new(auth);
    let host = Arc::new(ListenerHost::new());
    let model = AdminModel::new(
        store.clone(),
        SessionGuard::new(auth.clone()),
        host.clone(),
        Handle::current(),
        range(),
        today,
        Duration::from_secs(3),
    );
    Fixture {
        store,
        auth,
        host,
        model,
    }
}

/// Activated and signed in, with the initial load applied.
async fn signed_in(store: ScriptedStore) -> Fixture {
    let mut f = fixture(
        store,
        MemoryAuth::new()
            .with_account(EMAIL, PASSWORD)
            .signed_in_as(EMAIL),
        date(2, 14),
    );
    f.model.activate();
    f.model.settle().await;
    assert!(f.model.is_authenticated());
    f.store.clear_calls();
    f
}

fn notification(model: &AdminModel) -> Option<(String, NotificationKind)> {
    model
        .notifications()
        .current()
        .map(|n| (n.message, n.kind))
}

#[tokio::test]
async fn test_signed_out_view_fetches_nothing() {
    let mut f = fixture(
        ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))]),
        MemoryAuth::new().with_account(EMAIL, PASSWORD),
        date(2, 14),
    );
    assert!(f.model.is_auth_pending());

    f.model.activate();
    f.model.settle().await;

    assert!(!f.model.is_auth_pending());
    assert!(!f.model.is_authenticated());

    f.model.step_next();
    f.model.select_date(date(3, 2));
    f.model.settle().await;

    assert!(f.store.calls().is_empty());
    assert!(f.model.view().entries().is_empty());
    assert!(!f.model.open_dialog());
}

#[tokio::test]
async fn test_sign_in_loads_data() {
    let mut f = fixture(
        ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))]),
        MemoryAuth::new().with_account(EMAIL, PASSWORD),
        date(2, 14),
    );
    f.model.activate();
    f.model.settle().await;

    f.model.set_email(EMAIL);
    f.model.set_password(PASSWORD);
    f.model.sign_in().unwrap();
    assert!(f.model.login().loading);
    f.model.settle().await;

    assert!(f.model.is_authenticated());
    assert_eq!(f.model.identity().and_then(|u| u.email.as_deref()), Some(EMAIL));
    assert!(!f.model.login().loading);
    assert!(f.model.login().password.is_empty());
    assert_eq!(f.model.view().entries().len(), 1);
    assert!(f.model.view().dates().contains(&date(2, 14)));
    assert_eq!(
        notification(&f.model),
        Some((MSG_SIGNED_IN.to_string(), NotificationKind::Success))
    );
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let mut f = fixture(
        ScriptedStore::new(),
        MemoryAuth::new().with_account(EMAIL, PASSWORD),
        date(2, 14),
    );
    f.model.activate();
    f.model.settle().await;

    f.model.set_email("   ");
    f.model.set_password(PASSWORD);
    assert_eq!(f.model.sign_in(), Err(ValidationError::MissingField("email")));

    f.model.set_email(EMAIL);
    f.model.set_password("");
    assert_eq!(f.model.sign_in(), Err(ValidationError::MissingField("password")));

    assert!(!f.model.login().loading);
    assert!(f.model.login().error.is_some());
    f.model.settle().await;
    assert!(!f.model.is_authenticated());
}

#[tokio::test]
async fn test_wrong_password_shows_inline_error() {
    let mut f = fixture(
        ScriptedStore::new(),
        MemoryAuth::new().with_account(EMAIL, PASSWORD),
        date(2, 14),
    );
    f.model.activate();
    f.model.settle().await;

    f.model.set_email(EMAIL);
    f.model.set_password("wrong");
    f.model.sign_in().unwrap();
    f.model.settle().await;

    assert!(!f.model.is_authenticated());
    assert!(!f.model.login().loading);
    assert_eq!(
        f.model.login().error.as_deref(),
        Some(AuthError::InvalidCredentials.user_message())
    );
    assert!(f.store.calls().is_empty());
}

#[tokio::test]
async fn test_sign_out_clears_data() {
    let mut f = signed_in(ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))])).await;
    assert_eq!(f.model.view().entries().len(), 1);

    f.model.sign_out();
    assert!(!f.model.is_authenticated());
    assert!(f.model.view().entries().is_empty());
    assert!(f.model.view().dates().is_empty());

    f.model.settle().await;
    assert_eq!(
        notification(&f.model),
        Some((MSG_SIGNED_OUT.to_string(), NotificationKind::Success))
    );
}

#[tokio::test]
async fn test_sign_out_unconfirmed_still_clears() {
    let mut f = signed_in(ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))])).await;
    f.auth.fail_sign_out(true);

    f.model.sign_out();
    f.model.settle().await;

    assert!(!f.model.is_authenticated());
    assert!(f.model.view().entries().is_empty());
    assert_eq!(
        notification(&f.model),
        Some((MSG_SIGN_OUT_UNCONFIRMED.to_string(), NotificationKind::Info))
    );
}

#[tokio::test]
async fn test_session_ending_elsewhere_clears_view() {
    let mut f = signed_in(ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))])).await;
    assert!(f.model.open_dialog());

    f.auth.expire();
    f.model.poll_channel();

    assert!(!f.model.is_authenticated());
    assert!(f.model.view().entries().is_empty());
    assert!(!f.model.dialog().is_open());
    assert_eq!(f.host.listener_count(), 0);
}

#[tokio::test]
async fn test_create_appends_and_marks_date() {
    let mut f = signed_in(ScriptedStore::new()).await;

    assert!(f.model.open_dialog());
    assert_eq!(f.model.dialog().date(), "2024-02-14");
    let dialog = f.model.dialog_mut();
    dialog.set_subject(" Math ");
    dialog.set_task("p. 12");
    f.model.submit_dialog().unwrap();
    f.model.settle().await;

    let entries = f.model.view().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].subject, "Math");
    assert!(f.model.view().dates().contains(&date(2, 14)));
    assert!(!f.model.dialog().is_open());
    assert!(f.model.dialog().subject().is_empty());
    assert_eq!(f.host.listener_count(), 0);
    assert_eq!(f.store.len(), 1);
    assert_eq!(f.store.count(|c| matches!(c, Call::FetchDates { .. })), 1);
    // The list is patched locally, not refetched
    assert_eq!(f.store.count(|c| matches!(c, Call::FetchByDate(_))), 0);
    assert_eq!(
        notification(&f.model),
        Some((MSG_ENTRY_ADDED.to_string(), NotificationKind::Success))
    );
}

#[tokio::test]
async fn test_direct_create_leaves_dialog_draft() {
    let mut f = signed_in(ScriptedStore::new()).await;

    assert!(f.model.open_dialog());
    f.model.dialog_mut().set_subject("Draft");
    f.model
        .create_entry(entry("Math", "p. 12", date(2, 14)))
        .unwrap();
    f.model.settle().await;

    assert_eq!(f.model.view().entries().len(), 1);
    assert!(f.model.dialog().is_open());
    assert_eq!(f.model.dialog().subject(), "Draft");
    assert_eq!(f.host.listener_count(), 2);
}

#[tokio::test]
async fn test_create_for_other_day_only_marks_date() {
    let mut f = signed_in(ScriptedStore::new()).await;

    f.model.open_dialog();
    let dialog = f.model.dialog_mut();
    dialog.set_subject("Art");
    dialog.set_task("Sketch");
    dialog.set_date("2024-02-20");
    f.model.submit_dialog().unwrap();
    f.model.settle().await;

    assert!(f.model.view().entries().is_empty());
    assert!(f.model.view().dates().contains(&date(2, 20)));
}

#[tokio::test]
async fn test_create_failure_keeps_dialog() {
    let mut f = signed_in(ScriptedStore::new()).await;
    f.store.fail_writes(true);

    f.model.open_dialog();
    let dialog = f.model.dialog_mut();
    dialog.set_subject("Math");
    dialog.set_task("p. 12");
    f.model.submit_dialog().unwrap();
    f.model.settle().await;

    assert!(f.model.dialog().is_open());
    assert!(!f.model.dialog().is_submitting());
    assert_eq!(f.model.dialog().subject(), "Math");
    assert!(f.model.view().entries().is_empty());
    assert_eq!(
        notification(&f.model),
        Some((MSG_ADD_FAILED.to_string(), NotificationKind::Error))
    );
}

#[tokio::test]
async fn test_invalid_dialog_makes_no_request() {
    let mut f = signed_in(ScriptedStore::new()).await;

    f.model.open_dialog();
    f.model.dialog_mut().set_task("p. 12");
    let err = f.model.submit_dialog().unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::MissingField("subject"))
    ));

    f.model.settle().await;
    assert!(f.store.calls().is_empty());
    assert!(f.model.dialog().is_open());
}

#[tokio::test]
async fn test_delete_waits_for_confirmation() {
    let mut f = signed_in(ScriptedStore::with_entries([
        entry("Math", "p. 12", date(2, 14)),
        entry("Science", "Lab", date(2, 14)),
    ]))
    .await;
    let id = f.model.view().entries()[0].id.clone();

    assert!(f.model.request_delete(&id));
    assert_eq!(f.model.pending_delete().map(|e| e.id.as_str()), Some(id.as_str()));
    f.model.cancel_delete();
    f.model.settle().await;
    assert_eq!(f.store.count(|c| matches!(c, Call::Delete(_))), 0);
    assert_eq!(f.model.view().entries().len(), 2);

    assert!(!f.model.confirm_delete());
    assert!(!f.model.request_delete("missing"));

    assert!(f.model.request_delete(&id));
    assert!(f.model.confirm_delete());
    f.model.settle().await;

    assert_eq!(f.store.calls().iter().filter(|c| **c == Call::Delete(id.clone())).count(), 1);
    assert_eq!(f.store.count(|c| matches!(c, Call::Delete(_))), 1);
    let remaining: Vec<&str> = f
        .model
        .view()
        .entries()
        .iter()
        .map(|e| e.subject.as_str())
        .collect();
    assert_eq!(remaining, vec!["Science"]);
    assert!(f.model.view().dates().contains(&date(2, 14)));
    assert_eq!(
        notification(&f.model),
        Some((MSG_ENTRY_DELETED.to_string(), NotificationKind::Success))
    );
}

#[tokio::test]
async fn test_deleting_last_entry_unmarks_date() {
    let mut f = signed_in(ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))])).await;
    let id = f.model.view().entries()[0].id.clone();

    f.model.request_delete(&id);
    f.model.confirm_delete();
    f.model.settle().await;

    assert!(f.model.view().entries().is_empty());
    assert!(!f.model.view().dates().contains(&date(2, 14)));
}

#[tokio::test]
async fn test_update_edits_in_place() {
    let mut f = signed_in(ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))])).await;
    let id = f.model.view().entries()[0].id.clone();

    f.model.update_entry(&id, "Maths", "p. 12-14").unwrap();
    f.model.settle().await;

    let updated = f.model.view().entry(&id).unwrap();
    assert_eq!(updated.subject, "Maths");
    assert_eq!(updated.task, "p. 12-14");
    assert_eq!(updated.homework_date, date(2, 14));
    assert_eq!(f.store.calls(), vec![Call::Update(id.clone())]);
    assert_eq!(
        notification(&f.model),
        Some((MSG_ENTRY_UPDATED.to_string(), NotificationKind::Success))
    );
}

#[tokio::test]
async fn test_update_failure_keeps_entry() {
    let mut f = signed_in(ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))])).await;
    let id = f.model.view().entries()[0].id.clone();
    f.store.fail_writes(true);

    f.model.update_entry(&id, "Maths", "p. 12-14").unwrap();
    f.model.settle().await;

    let unchanged = f.model.view().entry(&id).unwrap();
    assert_eq!(unchanged.subject, "Math");
    assert_eq!(unchanged.task, "p. 12");
    assert_eq!(f.store.calls(), vec![Call::Update(id.clone())]);
    assert_eq!(
        notification(&f.model),
        Some((MSG_UPDATE_FAILED.to_string(), NotificationKind::Error))
    );
}

#[tokio::test]
async fn test_delete_failure_keeps_entry() {
    let mut f = signed_in(ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))])).await;
    let id = f.model.view().entries()[0].id.clone();
    f.store.fail_writes(true);

    assert!(f.model.request_delete(&id));
    assert!(f.model.confirm_delete());
    f.model.settle().await;

    assert!(f.model.view().entry(&id).is_some());
    assert!(f.model.view().dates().contains(&date(2, 14)));
    assert!(f.model.pending_delete().is_none());
    assert_eq!(f.store.count(|c| matches!(c, Call::FetchDates { .. })), 0);
    assert_eq!(
        notification(&f.model),
        Some((MSG_DELETE_FAILED.to_string(), NotificationKind::Error))
    );
}

#[tokio::test]
async fn test_update_survives_reload() {
    let mut f = signed_in(ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))])).await;
    let id = f.model.view().entries()[0].id.clone();

    f.model.update_entry(&id, "Maths", "p. 12-14").unwrap();
    f.model.settle().await;

    f.model.select_date(date(2, 15));
    f.model.settle().await;
    assert!(f.model.view().entries().is_empty());

    f.model.select_date(date(2, 14));
    f.model.settle().await;

    let reloaded = f.model.view().entry(&id).unwrap();
    assert_eq!(reloaded.subject, "Maths");
    assert_eq!(reloaded.task, "p. 12-14");
    assert_eq!(f.store.count(|c| matches!(c, Call::FetchByDate(_))), 2);
}

#[tokio::test]
async fn test_expired_token_at_sign_in() {
    let mut f = fixture(
        ScriptedStore::with_entries([entry("Math", "p. 12", date(2, 14))]),
        MemoryAuth::new()
            .with_account(EMAIL, PASSWORD)
            .with_session_lifetime(0),
        date(2, 14),
    );
    f.model.activate();
    f.model.settle().await;

    f.model.set_email(EMAIL);
    f.model.set_password(PASSWORD);
    f.model.sign_in().unwrap();
    f.model.settle().await;

    assert!(!f.model.is_authenticated());
    assert!(f.model.view().entries().is_empty());
    assert!(!f.model.open_dialog());
    assert_eq!(
        notification(&f.model),
        Some((
            AuthError::SessionExpired.user_message().to_string(),
            NotificationKind::Error,
        ))
    );
}

#[tokio::test]
async fn test_restored_expired_session_refuses_mutations() {
    let mut f = fixture(
        ScriptedStore::new(),
        MemoryAuth::new()
            .with_session_lifetime(0)
            .signed_in_as(EMAIL),
        date(2, 14),
    );
    f.model.activate();
    f.model.settle().await;
    f.store.clear_calls();

    let err = f
        .model
        .create_entry(entry("Math", "p. 12", date(2, 14)))
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(_)));
    assert!(!f.model.is_authenticated());

    f.model.settle().await;
    assert!(f.store.calls().is_empty());
}

#[tokio::test]
async fn test_mutations_refused_while_signed_out() {
    let mut f = fixture(
        ScriptedStore::new(),
        MemoryAuth::new().with_account(EMAIL, PASSWORD),
        date(2, 14),
    );
    f.model.activate();
    f.model.settle().await;

    let err = f
        .model
        .create_entry(entry("Math", "p. 12", date(2, 14)))
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::NotAuthenticated)));
    assert!(f.model.update_entry("1", "Math", "p. 12").is_err());
    assert!(!f.model.request_delete("1"));

    f.model.settle().await;
    assert!(f.store.calls().is_empty());
}

#[tokio::test]
async fn test_escape_and_outside_click_close_dialog() {
    let mut f = signed_in(ScriptedStore::new()).await;

    assert!(f.model.open_dialog());
    assert_eq!(f.host.listener_count(), 2);
    f.host.press("Escape");
    f.model.poll_channel();
    assert!(!f.model.dialog().is_open());
    assert_eq!(f.host.listener_count(), 0);

    f.model.open_dialog();
    f.host.click_outside();
    f.model.poll_channel();
    assert!(!f.model.dialog().is_open());
    assert_eq!(f.host.listener_count(), 0);
}

#[tokio::test]
async fn test_dialog_date_follows_selection() {
    let mut f = signed_in(ScriptedStore::new()).await;

    f.model.select_date(date(2, 21));
    f.model.settle().await;
    f.model.open_dialog();
    assert_eq!(f.model.dialog().date(), "2024-02-21");
}

#[tokio::test]
async fn test_deactivate_releases_listeners() {
    let mut f = signed_in(ScriptedStore::new()).await;
    f.model.open_dialog();
    assert_eq!(f.auth.listener_count(), 1);

    f.model.deactivate();
    assert_eq!(f.auth.listener_count(), 0);
    assert_eq!(f.host.listener_count(), 0);

    drop(f.model);
    assert_eq!(f.auth.listener_count(), 0);
}
