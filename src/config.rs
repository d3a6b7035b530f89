use leptos::logging::warn;
use leptos::prelude::document;
use serde::{Deserialize, Serialize};

pub const CONFIG_ELEMENT_ID: &str = "dashboard-config";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeDefault {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub links_url: String,
    pub storage_prefix: String,
    pub default_theme: ThemeDefault,
    pub debounce_ms: u64,
    pub matrix_layout: bool,
    pub matrix_min_width: u32,
    pub extras_panel: bool,
    pub quick_bar: bool,
    pub max_tags: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            links_url: "./links.json".to_string(),
            storage_prefix: "cc-nav".to_string(),
            default_theme: ThemeDefault::System,
            debounce_ms: 80,
            matrix_layout: true,
            matrix_min_width: 900,
            extras_panel: true,
            quick_bar: true,
            max_tags: 8,
        }
    }
}

impl DashboardConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn theme_key(&self) -> String {
        format!("{}:theme", self.storage_prefix)
    }

    pub fn collapsed_key(&self) -> String {
        format!("{}:collapsedGroups", self.storage_prefix)
    }

    /// Reads the JSON embedded in `index.html`; anything missing or broken
    /// falls back to defaults.
    pub fn load() -> Self {
        let Some(text) = document()
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };
        if text.trim().is_empty() {
            return Self::default();
        }
        Self::from_json(&text).unwrap_or_else(|e| {
            warn!("ignoring malformed #{CONFIG_ELEMENT_ID}: {e}");
            Self::default()
        })
    }
}
