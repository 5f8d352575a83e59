//! View state for the homework calendar: the public Home view, the Admin
//! view, notifications, theme and the services container wiring them up.

pub mod app_services;
pub mod models;
pub mod notification;
pub mod render;
pub mod routes;
pub mod services;

pub use app_services::AppServices;
pub use models::{
    AdminModel, CalendarView, DialogEvent, DialogHost, EntryDialog, HomeModel, ListenerHost,
    LoginForm, ManualSystemTheme, Refresh, SystemTheme, ThemeModel,
};
pub use notification::{Notification, NotificationKind, NotificationQueue};
pub use routes::Route;
