use leptos::html;
use leptos::logging::warn;
use leptos::prelude::*;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;
use wasm_bindgen::JsValue;

use crate::config::DashboardConfig;
use crate::preferences::{BrowserStorage, PreferenceStore, Theme};

pub const QUERY_PARAM: &str = "q";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    FocusSearch,
    ClearSearch,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct KeyPress<'a> {
    pub key: &'a str,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    /// Lowercase tag name of the focused element.
    pub active_tag: &'a str,
}

pub fn classify_key(press: &KeyPress) -> Option<Shortcut> {
    match press.key {
        "/" if !press.ctrl && !press.meta && !press.alt => {
            match press.active_tag {
                "input" | "textarea" => None,
                _ => Some(Shortcut::FocusSearch),
            }
        }
        "Escape" => Some(Shortcut::ClearSearch),
        _ => None,
    }
}

pub fn query_param(href: &str) -> String {
    Url::parse(href)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == QUERY_PARAM)
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_default()
}

/// Path, query and fragment for `history.replaceState`, with `q` set to the
/// trimmed query or dropped when it is blank.
pub fn with_query_param(href: &str, query: &str) -> Option<String> {
    let mut url = Url::parse(href).ok()?;
    let query = query.trim();
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (k, v) in url.query_pairs() {
        if k != QUERY_PARAM {
            pairs.push((k.into_owned(), v.into_owned()));
        } else if !replaced && !query.is_empty() {
            pairs.push((k.into_owned(), query.to_string()));
            replaced = true;
        }
    }
    if !replaced && !query.is_empty() {
        pairs.push((QUERY_PARAM.to_string(), query.to_string()));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    let mut target = url.path().to_string();
    if let Some(q) = url.query() {
        target.push('?');
        target.push_str(q);
    }
    if let Some(fragment) = url.fragment() {
        target.push('#');
        target.push_str(fragment);
    }
    Some(target)
}

pub fn current_href() -> String {
    window().location().href().unwrap_or_default()
}

pub fn system_prefers_light() -> bool {
    window()
        .match_media("(prefers-color-scheme: light)")
        .ok()
        .flatten()
        .map(|list| list.matches())
        .unwrap_or(false)
}

pub fn viewport_width() -> f64 {
    window()
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(0.0)
}

fn replace_url_query(query: &str) {
    let Some(url) = with_query_param(&current_href(), query) else {
        return;
    };
    if let Ok(history) = window().history() {
        if history
            .replace_state_with_url(&JsValue::NULL, "", Some(&url))
            .is_err()
        {
            warn!("history.replaceState rejected {url}");
        }
    }
}

fn apply_theme_attribute(theme: Theme) {
    if let Some(root) = document().document_element() {
        let _ = root.set_attribute("data-theme", theme.as_str());
    }
}

/// At most one pending callback; scheduling again cancels the previous one.
#[derive(Clone, Copy)]
pub struct Debouncer {
    pending: StoredValue<Option<TimeoutHandle>>,
    delay: Duration,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            pending: StoredValue::new(None),
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub fn schedule(&self, f: impl FnOnce() + 'static) {
        if let Some(handle) = self.pending.get_value() {
            handle.clear();
        }
        let pending = self.pending;
        let handle = set_timeout_with_handle(
            move || {
                pending.set_value(None);
                f();
            },
            self.delay,
        );
        match handle {
            Ok(handle) => self.pending.set_value(Some(handle)),
            Err(e) => warn!("could not schedule search: {e:?}"),
        }
    }
}

/// Owns the search field, the applied query and the user preferences; the
/// view only reads its signals and forwards events.
#[derive(Clone, Copy)]
pub struct InteractionController {
    pub search_ref: NodeRef<html::Input>,
    /// Live contents of the search field.
    pub input: RwSignal<String>,
    /// Query the page is currently rendered with.
    pub query: RwSignal<String>,
    pub theme: RwSignal<Theme>,
    pub collapsed: RwSignal<BTreeSet<String>>,
    prefs: StoredValue<PreferenceStore<BrowserStorage>>,
    debouncer: Debouncer,
}

impl InteractionController {
    pub fn new(config: &DashboardConfig) -> Self {
        let prefs = PreferenceStore::new(BrowserStorage, config);
        let theme = prefs.theme(system_prefers_light);
        prefs.set_theme(theme);
        apply_theme_attribute(theme);

        let initial = query_param(&current_href());
        Self {
            search_ref: NodeRef::new(),
            input: RwSignal::new(initial.clone()),
            query: RwSignal::new(initial),
            theme: RwSignal::new(theme),
            collapsed: RwSignal::new(prefs.collapsed_groups()),
            prefs: StoredValue::new(prefs),
            debouncer: Debouncer::new(config.debounce_ms),
        }
    }

    pub fn on_input(&self, text: String) {
        self.input.set(text);
        let this = *self;
        self.debouncer.schedule(move || {
            let text = this.input.get_untracked();
            replace_url_query(&text);
            this.query.set(text);
        });
    }

    pub fn clear_search(&self, refocus: bool) {
        self.on_input(String::new());
        let Some(field) = self.search_ref.get_untracked() else {
            return;
        };
        if refocus {
            let _ = field.focus();
        } else {
            let _ = field.blur();
        }
    }

    pub fn focus_search(&self) {
        if let Some(field) = self.search_ref.get_untracked() {
            let _ = field.focus();
        }
    }

    pub fn on_keydown(&self, ev: &web_sys::KeyboardEvent) {
        let active_tag = document()
            .active_element()
            .map(|el| el.tag_name().to_lowercase())
            .unwrap_or_default();
        let key = ev.key();
        let press = KeyPress {
            key: &key,
            ctrl: ev.ctrl_key(),
            meta: ev.meta_key(),
            alt: ev.alt_key(),
            active_tag: &active_tag,
        };
        match classify_key(&press) {
            Some(Shortcut::FocusSearch) => {
                ev.prevent_default();
                self.focus_search();
            }
            Some(Shortcut::ClearSearch) => self.clear_search(false),
            None => {}
        }
    }

    pub fn toggle_theme(&self) {
        let next = self.theme.get_untracked().toggled();
        self.prefs.with_value(|prefs| prefs.set_theme(next));
        apply_theme_attribute(next);
        self.theme.set(next);
    }

    pub fn toggle_group(&self, key: &str) {
        let current = self.collapsed.get_untracked();
        let collapsed = self.prefs.with_value(|prefs| prefs.toggle_group(&current, key));
        self.collapsed.set(collapsed);
    }
}
