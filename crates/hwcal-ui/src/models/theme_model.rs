//! Light/dark preference.

use std::sync::Arc;

use hwcal_core::{Listeners, Subscription, Theme, ThemeStore};
use parking_lot::Mutex;

pub type PreferenceCallback = Box<dyn Fn(bool) + Send + Sync>;

/// The host's ambient dark-mode preference.
pub trait SystemTheme: Send + Sync {
    fn prefers_dark(&self) -> bool;
    fn subscribe(&self, callback: PreferenceCallback) -> Subscription;
}

/// A system preference set by hand.
pub struct ManualSystemTheme {
    dark: Mutex<bool>,
    listeners: Listeners<bool>,
}

impl ManualSystemTheme {
    pub fn new(dark: bool) -> Self {
        Self {
            dark: Mutex::new(dark),
            listeners: Listeners::new(),
        }
    }

    pub fn set_dark(&self, dark: bool) {
        *self.dark.lock() = dark;
        self.listeners.emit(&dark);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl SystemTheme for ManualSystemTheme {
    fn prefers_dark(&self) -> bool {
        *self.dark.lock()
    }

    fn subscribe(&self, callback: PreferenceCallback) -> Subscription {
        self.listeners.subscribe(move |dark| callback(*dark))
    }
}

pub struct ThemeModel {
    store: ThemeStore,
    theme: Arc<Mutex<Theme>>,
    /// Held only while no explicit choice is saved
    system_sub: Option<Subscription>,
}

impl ThemeModel {
    pub fn new(store: ThemeStore, system: &dyn SystemTheme) -> Self {
        let saved = store.load();
        let theme = Arc::new(Mutex::new(
            saved.unwrap_or_else(|| Theme::from_dark(system.prefers_dark())),
        ));

        let system_sub = match saved {
            Some(_) => None,
            None => {
                let shared = theme.clone();
                Some(system.subscribe(Box::new(move |dark| {
                    *shared.lock() = Theme::from_dark(dark);
                })))
            }
        };

        Self {
            store,
            theme,
            system_sub,
        }
    }

    pub fn theme(&self) -> Theme {
        *self.theme.lock()
    }

    pub fn follows_system(&self) -> bool {
        self.system_sub.is_some()
    }

    /// Flip the theme and save it as an explicit choice.
    pub fn toggle(&mut self) -> Theme {
        self.system_sub = None;

        let next = {
            let mut theme = self.theme.lock();
            *theme = theme.toggled();
            *theme
        };

        if let Err(e) = self.store.save(next) {
            tracing::warn!("Failed to save theme preference: {}", e);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_system_until_toggled() {
        let dir = tempfile::tempdir().unwrap();
        let system = ManualSystemTheme::new(true);
        let mut model = ThemeModel::new(ThemeStore::new(dir.path().join("theme")), &system);

        assert_eq!(model.theme(), Theme::Dark);
        system.set_dark(false);
        assert_eq!(model.theme(), Theme::Light);

        assert_eq!(model.toggle(), Theme::Dark);
        assert!(!model.follows_system());
        assert_eq!(system.listener_count(), 0);

        system.set_dark(false);
        assert_eq!(model.theme(), Theme::Dark);
    }

    #[test]
    fn test_saved_choice_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme");
        ThemeStore::new(&path).save(Theme::Light).unwrap();

        let system = ManualSystemTheme::new(true);
        let model = ThemeModel::new(ThemeStore::new(&path), &system);
        assert_eq!(model.theme(), Theme::Light);
        assert_eq!(system.listener_count(), 0);
    }

    #[test]
    fn test_toggle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme");
        let system = ManualSystemTheme::new(false);

        let mut model = ThemeModel::new(ThemeStore::new(&path), &system);
        model.toggle();

        assert_eq!(ThemeStore::new(&path).load(), Some(Theme::Dark));
    }
}
