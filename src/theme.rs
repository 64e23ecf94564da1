use serde::{Deserialize, Serialize};

/// Fixed key under which the flag lives in the embedding environment's
/// key-value store.
pub const DARK_MODE_KEY: &str = "darkMode";

/// The single persisted display preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Seam to the embedding environment's local key-value store.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Anything other than a stored literal "true" means light mode.
pub fn load_theme(store: &dyn PreferenceStore) -> Theme {
    match store.get(DARK_MODE_KEY).as_deref() {
        Some("true") => Theme::Dark,
        _ => Theme::Light,
    }
}

pub fn save_theme(store: &mut dyn PreferenceStore, theme: Theme) {
    let value = if theme.is_dark() { "true" } else { "false" };
    store.set(DARK_MODE_KEY, value);
}

/// Flip the stored preference and return the new theme.
pub fn toggle_theme(store: &mut dyn PreferenceStore) -> Theme {
    let next = load_theme(store).toggled();
    save_theme(store, next);
    next
}
