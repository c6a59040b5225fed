use std::sync::{Arc, PoisonError, RwLock};

use quiz_core::model::{Palette, Theme};

/// Process-wide display preferences.
///
/// Cloning yields another handle to the same state. Nothing is persisted: a
/// new store always starts with `Theme::Light`.
#[derive(Clone, Default)]
pub struct SettingsStore {
    theme: Arc<RwLock<Theme>>,
}

impl SettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        *self.theme.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_theme(&self, theme: Theme) {
        *self.theme.write().unwrap_or_else(PoisonError::into_inner) = theme;
        log::debug!("theme set to {theme}");
    }

    /// Switch between light and dark, returning the new theme.
    pub fn toggle(&self) -> Theme {
        let mut guard = self.theme.write().unwrap_or_else(PoisonError::into_inner);
        *guard = guard.toggled();
        *guard
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        self.theme().palette()
    }
}
