pub mod admin_model;
pub mod calendar_view;
pub mod entry_dialog;
pub mod feed;
pub mod home_model;
pub mod theme_model;

pub use admin_model::{AdminModel, LoginForm};
pub use calendar_view::{CalendarView, Refresh};
pub use entry_dialog::{DialogEvent, DialogHost, EntryDialog, ListenerHost};
pub use feed::CalendarFeed;
pub use home_model::HomeModel;
pub use theme_model::{ManualSystemTheme, SystemTheme, ThemeModel};
