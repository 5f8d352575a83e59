//! Single-slot status message with timed dismissal.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Default)]
struct Slot {
    current: Option<Notification>,
    /// Bumped on every post and dismissal so an outdated timer can tell it lost
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Slot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Holds at most one notification. Posting replaces the current one and
/// restarts the dismissal timer.
pub struct NotificationQueue {
    slot: Arc<Mutex<Slot>>,
    duration: Duration,
    runtime: Handle,
}

impl NotificationQueue {
    pub fn new(duration: Duration, runtime: Handle) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            duration,
            runtime,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn post(&self, message: impl Into<String>, kind: NotificationKind) {
        let notification = Notification {
            message: message.into(),
            kind,
        };
        tracing::debug!("Notification ({:?}): {}", kind, notification.message);

        let mut slot = self.slot.lock();
        slot.cancel_timer();
        slot.generation += 1;
        slot.current = Some(notification);

        let generation = slot.generation;
        let weak = Arc::downgrade(&self.slot);
        let duration = self.duration;
        slot.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(slot) = weak.upgrade() {
                let mut slot = slot.lock();
                if slot.generation == generation {
                    slot.current = None;
                    slot.timer = None;
                }
            }
        }));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.post(message, NotificationKind::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.post(message, NotificationKind::Error);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.post(message, NotificationKind::Info);
    }

    pub fn dismiss(&self) {
        let mut slot = self.slot.lock();
        slot.cancel_timer();
        slot.generation += 1;
        slot.current = None;
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot.lock().current.clone()
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        self.slot.lock().cancel_timer();
    }
}
