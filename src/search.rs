use crate::model::LinkItem;

/// Trimmed, lowercased form used on both sides of a match.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn search_text(item: &LinkItem) -> String {
    let tags = item.tags.join(" ");
    let parts = [
        item.title.as_deref().unwrap_or(""),
        item.desc.as_deref().unwrap_or(""),
        tags.as_str(),
        item.url(),
    ];
    let joined = parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&joined)
}

/// `normalized_query` must already have gone through [`normalize`].
pub fn matches(item: &LinkItem, normalized_query: &str) -> bool {
    normalized_query.is_empty() || search_text(item).contains(normalized_query)
}

pub fn filter<'a>(items: &'a [LinkItem], query: &str) -> Vec<&'a LinkItem> {
    let q = normalize(query);
    items.iter().filter(|item| matches(item, &q)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(title: &str, desc: Option<&str>, tags: &[&str], url: Option<&str>) -> LinkItem {
        LinkItem {
            title: Some(title.to_string()),
            desc: desc.map(str::to_string),
            url: url.map(str::to_string),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..LinkItem::default()
        }
    }

    #[test]
    fn search_text_joins_present_fields() {
        let it = item("  GitHub ", None, &["Code", "Git"], Some("https://GitHub.com"));
        assert_eq!(search_text(&it), "github  code git https://github.com");
        assert_eq!(search_text(&LinkItem::default()), "");
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(matches(&LinkItem::default(), ""));
    }

    #[test]
    fn matches_substring_across_fields() {
        let it = item("Docs", Some("Rust reference"), &["lang"], Some("https://doc.rust-lang.org"));
        assert!(matches(&it, &normalize("  REFERENCE ")));
        assert!(matches(&it, "lang"));
        assert!(matches(&it, "rust-lang.org"));
        assert!(!matches(&it, "python"));
    }

    #[test]
    fn filter_keeps_only_containing_items() {
        let items = vec![
            item("Alpha", None, &[], None),
            item("Beta", None, &["alpha-ish"], None),
            item("Gamma", None, &[], None),
        ];
        let hits = filter(&items, "ALPHA");
        assert_eq!(hits.len(), 2);
        assert_eq!(filter(&items, "").len(), 3);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn filter_agrees_with_search_text(title in "[a-zA-Z ]{0,12}", q in "[a-zA-Z]{0,3}") {
            let it = item(&title, None, &[], None);
            let expected = search_text(&it).contains(&normalize(&q));
            prop_assert_eq!(filter(std::slice::from_ref(&it), &q).len() == 1, expected);
        }
    }
}
