//! Page view-model. Everything the DOM shows is decided here, from plain
//! inputs, so the same inputs always yield the same page.

use std::collections::BTreeSet;
use url::Url;

use crate::config::DashboardConfig;
use crate::format::{host_label, link_href, link_target, resolve_icon, Icon};
use crate::loader::LoadError;
use crate::model::{Document, Extras, Group, Layout, LinkItem};
use crate::search::{filter, normalize};

pub const DEFAULT_PAGE_TITLE: &str = "CC 导航";
pub const LOADING_STATUS: &str = "正在加载 links.json…";
const UNTITLED_GROUP: &str = "未命名分组";
const UNTITLED_ITEM: &str = "未命名";
const NOTE_TITLE: &str = "备忘";
const QUICK_TITLE: &str = "快捷入口";
const QUICK_BAR_FALLBACK: &str = "快捷";
const EXTRAS_QUICK_LIMIT: usize = 12;
const QUICK_BAR_LIMIT: usize = 24;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Failed(String),
    Ready(Document),
}

impl From<Result<Document, LoadError>> for LoadState {
    fn from(result: Result<Document, LoadError>) -> Self {
        match result {
            Ok(doc) => LoadState::Ready(doc),
            Err(e) => LoadState::Failed(format!("加载失败：{e}")),
        }
    }
}

/// Everything besides the document that the page depends on.
pub struct ViewContext<'a> {
    pub query: &'a str,
    pub collapsed: &'a BTreeSet<String>,
    pub viewport_width: f64,
    pub base: Option<&'a Url>,
    pub config: &'a DashboardConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardModel {
    pub href: String,
    pub target: &'static str,
    pub title: String,
    pub meta: String,
    pub desc: Option<String>,
    pub tags: Vec<String>,
    pub icon: Icon,
    /// Pinned `(row, col)` when matrix placement is active.
    pub cell: Option<(u32, u32)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupModel {
    pub key: String,
    pub name: String,
    pub count: usize,
    pub collapsed: bool,
    pub cards: Vec<CardModel>,
}

impl GroupModel {
    pub fn chevron(&self) -> &'static str {
        if self.collapsed {
            "▸"
        } else {
            "▾"
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridModel {
    pub matrix: bool,
    pub cards: Vec<CardModel>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageBody {
    Empty,
    Groups(Vec<GroupModel>),
    Flat(GridModel),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuickModel {
    pub href: String,
    pub target: &'static str,
    pub label: String,
    pub icon: Icon,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtrasModel {
    pub note_title: &'static str,
    pub note: Option<String>,
    pub quick_title: &'static str,
    pub quick: Vec<QuickModel>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageModel {
    pub title: String,
    pub status: String,
    pub body: PageBody,
    pub extras: Option<ExtrasModel>,
    pub quick_bar: Vec<QuickModel>,
}

impl PageModel {
    fn status_only(status: String) -> Self {
        Self {
            title: DEFAULT_PAGE_TITLE.to_string(),
            status,
            body: PageBody::Empty,
            extras: None,
            quick_bar: Vec::new(),
        }
    }

    pub fn card_count(&self) -> usize {
        match &self.body {
            PageBody::Empty => 0,
            PageBody::Groups(groups) => groups.iter().map(|g| g.cards.len()).sum(),
            PageBody::Flat(grid) => grid.cards.len(),
        }
    }
}

pub fn build_page(state: &LoadState, ctx: &ViewContext) -> PageModel {
    let doc = match state {
        LoadState::Loading => return PageModel::status_only(LOADING_STATUS.to_string()),
        LoadState::Failed(message) => return PageModel::status_only(message.clone()),
        LoadState::Ready(doc) => doc,
    };

    let q = normalize(ctx.query);
    let (body, shown) = match &doc.layout {
        Layout::Grouped(groups) => {
            let groups = build_groups(groups, &q, ctx);
            let shown = groups.iter().map(|g| g.count).sum();
            (PageBody::Groups(groups), shown)
        }
        Layout::Flat { items, matrix } => {
            let grid = build_flat(items, *matrix, &q, ctx);
            let shown = grid.cards.len();
            (PageBody::Flat(grid), shown)
        }
    };

    let status = if q.is_empty() {
        format!("共 {} 个链接", doc.total_items())
    } else if shown > 0 {
        format!("“{}”：共 {} 条结果", ctx.query, shown)
    } else {
        format!("“{}”：未找到匹配项", ctx.query)
    };

    let title = doc
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string());

    PageModel {
        title,
        status,
        body,
        extras: doc
            .extras
            .as_ref()
            .filter(|_| ctx.config.extras_panel)
            .and_then(|extras| build_extras(extras, ctx.base)),
        quick_bar: doc
            .extras
            .as_ref()
            .filter(|_| ctx.config.quick_bar)
            .map(|extras| build_quick(&extras.quick, QUICK_BAR_LIMIT, QUICK_BAR_FALLBACK, ctx.base))
            .unwrap_or_default(),
    }
}

fn build_groups(groups: &[Group], q: &str, ctx: &ViewContext) -> Vec<GroupModel> {
    groups
        .iter()
        .filter_map(|group| {
            let hits = filter(&group.items, q);
            if !q.is_empty() && hits.is_empty() {
                return None;
            }
            let key = group.key().to_string();
            let collapsed = ctx.collapsed.contains(&key);
            let cards = if collapsed {
                Vec::new()
            } else {
                hits.iter().map(|it| build_card(it, None, ctx)).collect()
            };
            Some(GroupModel {
                name: group
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| UNTITLED_GROUP.to_string()),
                key,
                count: hits.len(),
                collapsed,
                cards,
            })
        })
        .collect()
}

fn build_flat(items: &[LinkItem], matrix: bool, q: &str, ctx: &ViewContext) -> GridModel {
    let pinned = matrix
        && ctx.config.matrix_layout
        && q.is_empty()
        && ctx.viewport_width > f64::from(ctx.config.matrix_min_width);
    let cards = filter(items, q)
        .into_iter()
        .map(|it| build_card(it, it.pos.filter(|_| pinned), ctx))
        .collect();
    GridModel {
        matrix: pinned,
        cards,
    }
}

fn build_card(item: &LinkItem, cell: Option<(u32, u32)>, ctx: &ViewContext) -> CardModel {
    let url = item.url();
    CardModel {
        href: link_href(url),
        target: link_target(url),
        title: item
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED_ITEM.to_string()),
        meta: host_label(url, ctx.base),
        desc: item.desc.clone().filter(|d| !d.is_empty()),
        tags: item.tags.iter().take(ctx.config.max_tags).cloned().collect(),
        icon: resolve_icon(item, ctx.base),
        cell,
    }
}

fn build_quick(items: &[LinkItem], limit: usize, fallback: &str, base: Option<&Url>) -> Vec<QuickModel> {
    items
        .iter()
        .filter(|it| !it.url().is_empty() || it.title.as_deref().is_some_and(|t| !t.is_empty()))
        .take(limit)
        .map(|it| {
            let url = it.url();
            let label = it
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .or_else(|| Some(host_label(url, base)).filter(|h| !h.is_empty()))
                .unwrap_or_else(|| fallback.to_string());
            QuickModel {
                href: link_href(url),
                target: link_target(url),
                label,
                icon: resolve_icon(it, base),
            }
        })
        .collect()
}

fn build_extras(extras: &Extras, base: Option<&Url>) -> Option<ExtrasModel> {
    let note = extras
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let quick = build_quick(&extras.quick, EXTRAS_QUICK_LIMIT, QUICK_TITLE, base);
    if note.is_none() && quick.is_empty() {
        return None;
    }
    Some(ExtrasModel {
        note_title: NOTE_TITLE,
        note,
        quick_title: QUICK_TITLE,
        quick,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::LOCAL_LABEL;

    fn ready(json: &str) -> LoadState {
        LoadState::Ready(Document::from_json(json).unwrap())
    }

    fn page(state: &LoadState, query: &str, collapsed: &BTreeSet<String>, width: f64) -> PageModel {
        let config = DashboardConfig::default();
        build_page(
            state,
            &ViewContext {
                query,
                collapsed,
                viewport_width: width,
                base: None,
                config: &config,
            },
        )
    }

    fn groups(model: &PageModel) -> &[GroupModel] {
        match &model.body {
            PageBody::Groups(groups) => groups,
            other => panic!("expected groups, got {other:?}"),
        }
    }

    fn grid(model: &PageModel) -> &GridModel {
        match &model.body {
            PageBody::Flat(grid) => grid,
            other => panic!("expected flat grid, got {other:?}"),
        }
    }

    const GROUPED: &str = r#"{
        "title": "Links",
        "groups": [
            {"id": "dev", "name": "Dev", "items": [
                {"title": "GitHub", "url": "https://www.github.com", "tags": ["git", "code"]},
                {"title": "Docs", "url": "https://docs.rs", "desc": "crate docs"}
            ]},
            {"name": "Local", "items": [
                {"title": "Notes", "url": "file:///a/b.txt"}
            ]}
        ]
    }"#;

    #[test]
    fn renders_all_groups_without_query() {
        let state = ready(GROUPED);
        let model = page(&state, "", &BTreeSet::new(), 1200.0);
        assert_eq!(model.title, "Links");
        assert_eq!(model.status, "共 3 个链接");
        let gs = groups(&model);
        assert_eq!(gs.len(), 2);
        assert_eq!(gs[0].key, "dev");
        assert_eq!(gs[1].key, "Local");
        assert_eq!(gs[0].chevron(), "▾");
        assert_eq!(gs[0].cards[0].meta, "github.com");
        assert_eq!(gs[0].cards[0].target, "_blank");
    }

    #[test]
    fn search_hides_groups_without_matches() {
        let state = ready(GROUPED);
        let model = page(&state, "  Crate ", &BTreeSet::new(), 1200.0);
        let gs = groups(&model);
        assert_eq!(gs.len(), 1);
        assert_eq!(gs[0].count, 1);
        assert_eq!(gs[0].cards[0].title, "Docs");
        assert_eq!(model.status, "“  Crate ”：共 1 条结果");

        let none = page(&state, "zzz", &BTreeSet::new(), 1200.0);
        assert!(groups(&none).is_empty());
        assert_eq!(none.status, "“zzz”：未找到匹配项");
    }

    #[test]
    fn collapsed_group_keeps_header_only() {
        let state = ready(GROUPED);
        let collapsed = BTreeSet::from(["dev".to_string()]);
        let model = page(&state, "", &collapsed, 1200.0);
        let dev = &groups(&model)[0];
        assert!(dev.collapsed);
        assert_eq!(dev.chevron(), "▸");
        assert_eq!(dev.count, 2);
        assert!(dev.cards.is_empty());
        assert_eq!(model.card_count(), 1);
    }

    #[test]
    fn file_url_opens_in_same_tab_with_local_label() {
        let state = ready(GROUPED);
        let model = page(&state, "notes", &BTreeSet::new(), 1200.0);
        let card = &groups(&model)[0].cards[0];
        assert_eq!(card.target, "_self");
        assert_eq!(card.meta, LOCAL_LABEL);
        assert_eq!(card.href, "file:///a/b.txt");
    }

    #[test]
    fn status_reports_match_count() {
        let items: Vec<String> = (0..9)
            .map(|i| {
                let title = if i % 3 == 0 { format!("rust {i}") } else { format!("other {i}") };
                format!(r#"{{"title":"{title}"}}"#)
            })
            .collect();
        let state = ready(&format!(r#"{{"items":[{}]}}"#, items.join(",")));
        let model = page(&state, "rust", &BTreeSet::new(), 1200.0);
        assert_eq!(grid(&model).cards.len(), 3);
        assert_eq!(model.status, "“rust”：共 3 条结果");
    }

    #[test]
    fn matrix_pins_cards_only_on_wide_idle_view() {
        let state = ready(
            r#"{"layout":"matrix","items":[
                {"title":"pinned","pos":[2,3]},
                {"title":"loose","pos":[0,1]}
            ]}"#,
        );
        let wide = page(&state, "", &BTreeSet::new(), 1400.0);
        assert!(grid(&wide).matrix);
        assert_eq!(grid(&wide).cards[0].cell, Some((2, 3)));
        assert_eq!(grid(&wide).cards[1].cell, None);

        let searching = page(&state, "pinned", &BTreeSet::new(), 1400.0);
        assert!(!grid(&searching).matrix);
        assert_eq!(grid(&searching).cards[0].cell, None);

        let narrow = page(&state, "", &BTreeSet::new(), 600.0);
        assert_eq!(grid(&narrow).cards[0].cell, None);
    }

    #[test]
    fn failed_load_renders_no_cards() {
        let state = LoadState::from(Err::<Document, _>(LoadError::Http {
            status: 404,
            status_text: "Not Found".to_string(),
        }));
        let model = page(&state, "", &BTreeSet::new(), 1200.0);
        assert!(model.status.contains("404"));
        assert_eq!(model.card_count(), 0);
        assert!(model.extras.is_none());
        assert!(model.quick_bar.is_empty());
    }

    #[test]
    fn loading_state_shows_progress() {
        let model = page(&LoadState::Loading, "", &BTreeSet::new(), 1200.0);
        assert_eq!(model.status, LOADING_STATUS);
        assert_eq!(model.body, PageBody::Empty);
    }

    #[test]
    fn cards_fall_back_and_truncate_tags() {
        let state = ready(r#"{"items":[{"tags":["1","2","3","4","5","6","7","8","9","10"]}]}"#);
        let model = page(&state, "", &BTreeSet::new(), 1200.0);
        let card = &grid(&model).cards[0];
        assert_eq!(card.title, "未命名");
        assert_eq!(card.tags.len(), 8);
        assert_eq!(card.href, "#");
        assert_eq!(card.desc, None);
        assert_eq!(model.title, DEFAULT_PAGE_TITLE);
    }

    #[test]
    fn extras_and_quick_bar_are_bounded() {
        let quick: Vec<String> = (0..30)
            .map(|i| format!(r#"{{"url":"https://site{i}.example.com"}}"#))
            .collect();
        let state = ready(&format!(
            r#"{{"items":[],"extras":{{"note":"  remember  ","quick":[{{}},{}]}}}}"#,
            quick.join(",")
        ));
        let model = page(&state, "", &BTreeSet::new(), 1200.0);
        let extras = model.extras.as_ref().unwrap();
        assert_eq!(extras.note.as_deref(), Some("remember"));
        assert_eq!(extras.quick.len(), 12);
        assert_eq!(extras.quick[0].label, "site0.example.com");
        assert_eq!(model.quick_bar.len(), 24);
    }

    #[test]
    fn quick_label_falls_back_to_generic_text() {
        let state = ready(r#"{"items":[],"extras":{"quick":[{"title":"","url":"mailto:x@y.z"}]}}"#);
        let model = page(&state, "", &BTreeSet::new(), 1200.0);
        assert_eq!(model.extras.unwrap().quick[0].label, "快捷入口");
        assert_eq!(model.quick_bar[0].label, "快捷");
    }

    #[test]
    fn rendering_is_repeatable() {
        let state = ready(GROUPED);
        let collapsed = BTreeSet::from(["Local".to_string()]);
        assert_eq!(
            page(&state, "git", &collapsed, 1000.0),
            page(&state, "git", &collapsed, 1000.0)
        );
    }
}
