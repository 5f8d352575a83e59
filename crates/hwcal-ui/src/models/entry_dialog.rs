//! Create-entry dialog.
//!
//! While open the dialog holds an outside-click listener and a key listener
//! on its host. Both are released whenever it closes, including on drop.

use chrono::NaiveDate;
use hwcal_calendar::{format_date, parse_date};
use hwcal_core::{Listeners, Subscription, ValidationError};
use hwcal_store::NewEntry;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub type ClickCallback = Box<dyn Fn() + Send + Sync>;
pub type KeyCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Where the dialog listens for input outside its own fields.
pub trait DialogHost: Send + Sync {
    fn on_outside_click(&self, callback: ClickCallback) -> Subscription;
    fn on_key(&self, callback: KeyCallback) -> Subscription;
}

/// A host driven by explicit calls.
#[derive(Default)]
pub struct ListenerHost {
    clicks: Listeners<()>,
    keys: Listeners<String>,
}

impl ListenerHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click_outside(&self) {
        self.clicks.emit(&());
    }

    pub fn press(&self, key: &str) {
        self.keys.emit(&key.to_string());
    }

    pub fn listener_count(&self) -> usize {
        self.clicks.len() + self.keys.len()
    }
}

impl DialogHost for ListenerHost {
    fn on_outside_click(&self, callback: ClickCallback) -> Subscription {
        self.clicks.subscribe(move |_| callback())
    }

    fn on_key(&self, callback: KeyCallback) -> Subscription {
        self.keys.subscribe(move |key| callback(key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    OutsideClick,
    Key(String),
}

pub struct EntryDialog {
    open: bool,
    subject: String,
    task: String,
    date: String,
    /// Set once the user types a date; until then it follows the selection
    date_edited: bool,
    submitting: bool,
    listeners: Vec<Subscription>,
    tx: UnboundedSender<DialogEvent>,
    rx: UnboundedReceiver<DialogEvent>,
}

impl EntryDialog {
    pub fn new(selected: NaiveDate) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            open: false,
            subject: String::new(),
            task: String::new(),
            date: format_date(selected),
            date_edited: false,
            submitting: false,
            listeners: Vec::new(),
            tx,
            rx,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn open(&mut self, host: &dyn DialogHost) {
        if self.open {
            return;
        }
        self.open = true;

        let tx = self.tx.clone();
        self.listeners.push(host.on_outside_click(Box::new(move || {
            let _ = tx.send(DialogEvent::OutsideClick);
        })));
        let tx = self.tx.clone();
        self.listeners.push(host.on_key(Box::new(move |key| {
            let _ = tx.send(DialogEvent::Key(key.to_string()));
        })));
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.submitting = false;
        self.listeners.clear();
        // Input that arrived before closing no longer applies
        while self.rx.try_recv().is_ok() {}
    }

    pub fn set_subject(&mut self, subject: &str) {
        self.subject = subject.to_string();
    }

    pub fn set_task(&mut self, task: &str) {
        self.task = task.to_string();
    }

    pub fn set_date(&mut self, date: &str) {
        self.date = date.to_string();
        self.date_edited = true;
    }

    /// Follow the calendar selection unless the date was typed in.
    pub fn sync_date(&mut self, selected: NaiveDate) {
        if !self.date_edited {
            self.date = format_date(selected);
        }
    }

    /// Apply pending host input. Returns true if the dialog closed.
    pub fn poll_events(&mut self) -> bool {
        while let Ok(event) = self.rx.try_recv() {
            let dismiss = match &event {
                DialogEvent::OutsideClick => true,
                DialogEvent::Key(key) => key == "Escape",
            };
            if dismiss && self.open {
                tracing::debug!("Entry dialog dismissed by {:?}", event);
                self.close();
                return true;
            }
        }
        false
    }

    /// Validate the form and mark it as submitting.
    pub fn submit(&mut self) -> Result<NewEntry, ValidationError> {
        let date = parse_date(self.date.trim())?;
        let entry = NewEntry::new(&self.subject, &self.task, date)?;
        self.submitting = true;
        Ok(entry)
    }

    /// Clear the form and close after a successful create.
    pub fn finish_success(&mut self, selected: NaiveDate) {
        self.subject.clear();
        self.task.clear();
        self.date_edited = false;
        self.date = format_date(selected);
        self.close();
    }

    /// Keep the form open with its contents after a failed create.
    pub fn finish_failure(&mut self) {
        self.submitting = false;
    }
}
