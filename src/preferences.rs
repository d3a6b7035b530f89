use leptos::logging::warn;
use leptos::prelude::window;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::config::{DashboardConfig, ThemeDefault};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// `window.localStorage`. Unavailable storage reads as empty and drops writes.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        window().local_storage().ok().flatten()
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            warn!("local storage unavailable; {key} not saved");
            return;
        };
        if storage.set_item(key, value).is_err() {
            warn!("failed to write {key} to local storage");
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Text shown on the toggle button.
    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "浅色",
            Theme::Dark => "深色",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PreferenceStore<S> {
    store: S,
    theme_key: String,
    collapsed_key: String,
    default_theme: ThemeDefault,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S, config: &DashboardConfig) -> Self {
        Self {
            store,
            theme_key: config.theme_key(),
            collapsed_key: config.collapsed_key(),
            default_theme: config.default_theme,
        }
    }

    pub fn theme(&self, system_prefers_light: impl FnOnce() -> bool) -> Theme {
        if let Some(saved) = self.store.get(&self.theme_key).as_deref().and_then(Theme::parse) {
            return saved;
        }
        match self.default_theme {
            ThemeDefault::Light => Theme::Light,
            ThemeDefault::Dark => Theme::Dark,
            ThemeDefault::System if system_prefers_light() => Theme::Light,
            ThemeDefault::System => Theme::Dark,
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        self.store.set(&self.theme_key, theme.as_str());
    }

    pub fn collapsed_groups(&self) -> BTreeSet<String> {
        self.store
            .get(&self.collapsed_key)
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            .and_then(|value| match value {
                serde_json::Value::Array(entries) => Some(
                    entries
                        .into_iter()
                        .filter_map(|entry| entry.as_str().map(str::to_string))
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn set_collapsed_groups(&self, collapsed: &BTreeSet<String>) {
        match serde_json::to_string(collapsed) {
            Ok(json) => self.store.set(&self.collapsed_key, &json),
            Err(e) => warn!("could not serialize collapsed groups: {e}"),
        }
    }

    /// Flips `key` in the live set `current`, persists and returns the result.
    pub fn toggle_group(&self, current: &BTreeSet<String>, key: &str) -> BTreeSet<String> {
        let mut collapsed = current.clone();
        if !collapsed.remove(key) {
            collapsed.insert(key.to_string());
        }
        self.set_collapsed_groups(&collapsed);
        collapsed
    }
}
