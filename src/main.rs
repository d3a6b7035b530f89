mod app;
mod config;
mod controller;
mod format;
mod loader;
mod model;
mod preferences;
mod render;
mod search;

use app::*;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(|| {
        view! {
            <App/>
        }
    })
}
