//! Plain-text rendering of the views.
//!
//! Grid cells are five columns wide: `[14]` marks the selected day, `(10)`
//! marks today and a trailing `*` marks a day with homework.

use std::fmt::Write;

use hwcal_calendar::{format_date, DateCell, MONTH_NAMES, WEEKDAY_LABELS};
use hwcal_core::Theme;
use hwcal_store::Entry;

use crate::models::{AdminModel, CalendarView, HomeModel};
use crate::notification::{Notification, NotificationKind};

fn render_cell(cell: &DateCell) -> String {
    let Some(day) = cell.day else {
        return " ".repeat(5);
    };

    let (left, right) = if cell.is_selected {
        ('[', ']')
    } else if cell.is_today {
        ('(', ')')
    } else {
        (' ', ' ')
    };
    let mark = if cell.has_entry { '*' } else { ' ' };
    format!("{}{:>2}{}{}", left, day, right, mark)
}

pub fn render_calendar(view: &CalendarView) -> String {
    let cursor = view.cursor();
    let mut out = String::new();

    let month_name = MONTH_NAMES
        .get(cursor.month as usize)
        .copied()
        .unwrap_or("?");
    let _ = writeln!(out, "{} {}", month_name, cursor.year);

    let header: String = WEEKDAY_LABELS.iter().map(|l| format!(" {}  ", l)).collect();
    let _ = writeln!(out, "{}", header.trim_end());

    let cells: Vec<String> = view.grid().iter().map(render_cell).collect();
    for row in cells.chunks(7) {
        let _ = writeln!(out, "{}", row.concat().trim_end());
    }
    out
}

pub fn render_entries(selected: chrono::NaiveDate, entries: &[Entry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Homework for {}:", format_date(selected));
    if entries.is_empty() {
        let _ = writeln!(out, "  No homework for this day.");
    }
    for entry in entries {
        let _ = writeln!(out, "  - {}: {}", entry.subject, entry.task);
        if let Some(created_at) = entry.created_at {
            let _ = writeln!(out, "    Added: {}", format_date(created_at.date_naive()));
        }
    }
    out
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.kind {
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
        NotificationKind::Info => "info",
    };
    format!("[{}] {}\n", tag, notification.message)
}

fn render_view(view: &CalendarView) -> String {
    let mut out = render_calendar(view);
    out.push('\n');
    out.push_str(&render_entries(view.selected(), view.entries()));
    out
}

pub fn render_home(model: &HomeModel, theme: Theme) -> String {
    let mut out = format!("Homework calendar ({:?} theme)\n\n", theme);
    out.push_str(&render_view(model.view()));
    out
}

pub fn render_admin(model: &AdminModel, theme: Theme) -> String {
    let mut out = format!("Homework calendar admin ({:?} theme)\n\n", theme);

    if let Some(notification) = model.notifications().current() {
        out.push_str(&render_notification(&notification));
    }

    if model.is_auth_pending() {
        out.push_str("Checking session...\n");
        return out;
    }

    let Some(user) = model.identity() else {
        out.push_str("Not signed in.\n");
        if let Some(error) = &model.login().error {
            let _ = writeln!(out, "{}", error);
        }
        return out;
    };

    let _ = writeln!(
        out,
        "Signed in as {}\n",
        user.email.as_deref().unwrap_or(&user.id)
    );
    out.push_str(&render_view(model.view()));
    out
}
