use leptos::ev;
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;
use url::Url;

use crate::config::DashboardConfig;
use crate::controller::{current_href, viewport_width, InteractionController};
use crate::format::{Icon, IconKind};
use crate::loader::load_document;
use crate::render::{
    build_page, CardModel, ExtrasModel, GroupModel, LoadState, PageBody, QuickModel, ViewContext,
};

fn icon_view(icon: &Icon) -> AnyView {
    let style = format!("--h:{}", icon.hue);
    match &icon.kind {
        IconKind::Image(src) => view! {
            <div class="card__icon" style=style>
                <img class="card__iconImg" src=src.clone() alt="" loading="lazy" decoding="async" />
            </div>
        }
        .into_any(),
        IconKind::Text(text) => view! {
            <div class="card__icon" style=style>
                <span class="card__iconText">{text.clone()}</span>
            </div>
        }
        .into_any(),
    }
}

fn card_view(card: &CardModel) -> impl IntoView {
    let placement = card
        .cell
        .map(|(row, col)| format!("grid-row: {row}; grid-column: {col};"))
        .unwrap_or_default();
    let tags = (!card.tags.is_empty()).then(|| {
        view! {
            <div class="tags">
                {card.tags.iter().map(|t| view! { <span class="tag">{t.clone()}</span> }).collect_view()}
            </div>
        }
    });
    view! {
        <a class="card" href=card.href.clone() target=card.target rel="noopener noreferrer" style=placement>
            {icon_view(&card.icon)}
            <div class="card__info">
                <div class="card__top">
                    <div class="card__title">{card.title.clone()}</div>
                    <div class="card__meta">{card.meta.clone()}</div>
                </div>
                {card.desc.clone().map(|d| view! { <div class="card__desc">{d}</div> })}
                {tags}
            </div>
        </a>
    }
}

fn group_view(group: &GroupModel, controller: InteractionController) -> impl IntoView {
    let key = group.key.clone();
    let body = (!group.collapsed).then(|| {
        view! { <div class="grid">{group.cards.iter().map(card_view).collect_view()}</div> }
    });
    view! {
        <section class="group">
            <div class="group__head" on:click=move |_| controller.toggle_group(&key)>
                <div class="group__title">
                    <span>{group.name.clone()}</span>
                    <span class="group__count">{group.count.to_string()}</span>
                </div>
                <div class="group__chev">{group.chevron()}</div>
            </div>
            <div class="group__body">{body}</div>
        </section>
    }
}

fn body_view(body: &PageBody, controller: InteractionController) -> AnyView {
    match body {
        PageBody::Empty => ().into_any(),
        PageBody::Groups(groups) => groups
            .iter()
            .map(|g| group_view(g, controller))
            .collect_view()
            .into_any(),
        PageBody::Flat(grid) => {
            let class = if grid.matrix { "grid grid--matrix" } else { "grid" };
            view! { <div class=class>{grid.cards.iter().map(card_view).collect_view()}</div> }
                .into_any()
        }
    }
}

fn quick_view(quick: &QuickModel, class: &'static str) -> impl IntoView {
    view! {
        <a class=class href=quick.href.clone() target=quick.target rel="noopener noreferrer">
            {icon_view(&quick.icon)}
            <div class={format!("{class}__label")}>{quick.label.clone()}</div>
        </a>
    }
}

fn extras_view(extras: &ExtrasModel) -> impl IntoView {
    let note = extras.note.clone().map(|note| {
        view! {
            <section class="extras__block">
                <div class="extras__title">{extras.note_title}</div>
                <div class="extras__text">{note}</div>
            </section>
        }
    });
    let quick = (!extras.quick.is_empty()).then(|| {
        view! {
            <section class="extras__block">
                <div class="extras__title">{extras.quick_title}</div>
                <div class="quickGrid">
                    {extras.quick.iter().map(|q| quick_view(q, "quick")).collect_view()}
                </div>
            </section>
        }
    });
    view! { {note} {quick} }
}

#[component]
pub fn App() -> impl IntoView {
    let config = DashboardConfig::load();
    let controller = InteractionController::new(&config);
    let (load_state, set_load_state) = signal(LoadState::Loading);
    let width = RwSignal::new(viewport_width());
    let base = Url::parse(&current_href()).ok();
    let config = StoredValue::new(config);

    Effect::new(move |_| {
        let links_url = config.with_value(|c| c.links_url.clone());
        spawn_local(async move {
            log!("fetching {links_url}");
            let result = load_document(&links_url).await;
            if let Err(e) = &result {
                error!("failed to load {links_url}: {e}");
            }
            set_load_state.set(LoadState::from(result));
        });
    });

    let _ = window_event_listener(ev::keydown, move |ev| controller.on_keydown(&ev));
    let _ = window_event_listener(ev::resize, move |_| width.set(viewport_width()));

    let page = Memo::new(move |_| {
        let query = controller.query.get();
        let collapsed = controller.collapsed.get();
        let viewport_width = width.get();
        load_state.with(|state| {
            config.with_value(|config| {
                build_page(
                    state,
                    &ViewContext {
                        query: &query,
                        collapsed: &collapsed,
                        viewport_width,
                        base: base.as_ref(),
                        config,
                    },
                )
            })
        })
    });

    Effect::new(move |_| document().set_title(&page.with(|p| p.title.clone())));

    view! {
        <header class="topbar">
            <div class="brand">{move || page.with(|p| p.title.clone())}</div>
            <div class="search">
                <input
                    id="searchInput"
                    class="search__input"
                    type="search"
                    placeholder="搜索标题、描述、标签（按 / 聚焦）"
                    autocomplete="off"
                    node_ref=controller.search_ref
                    prop:value=move || controller.input.get()
                    on:input=move |ev| controller.on_input(event_target_value(&ev))
                />
                <button class="search__clear" title="清除" on:click=move |_| controller.clear_search(true)>
                    "×"
                </button>
            </div>
            <button class="themeToggle" on:click=move |_| controller.toggle_theme()>
                {move || controller.theme.get().label()}
            </button>
        </header>
        <nav class="quickBar">
            {move || page.with(|p| p.quick_bar.iter().map(|q| quick_view(q, "quickBtn")).collect_view())}
        </nav>
        <p class="status">{move || page.with(|p| p.status.clone())}</p>
        <main class="layout">
            <div class="groups">{move || page.with(|p| body_view(&p.body, controller))}</div>
            <aside class="extras">{move || page.with(|p| p.extras.as_ref().map(extras_view))}</aside>
        </main>
    }
}
