pub mod auth_service;
pub mod entry_service;

pub use auth_service::{
    request_activate, request_sign_in, request_sign_out, AuthServiceMessage,
};
pub use entry_service::{
    request_create, request_delete, request_fetch_dates, request_fetch_entries, request_update,
    EntryServiceMessage,
};
