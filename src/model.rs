use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "lenient_pos")]
    pub pos: Option<(u32, u32)>,
}

impl LinkItem {
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<LinkItem>,
}

impl Group {
    /// Collapse-state key: `id`, then `name`, then `"group"`.
    pub fn key(&self) -> &str {
        non_empty(&self.id)
            .or_else(|| non_empty(&self.name))
            .unwrap_or("group")
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Extras {
    #[serde(default, deserialize_with = "lenient_string")]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub quick: Vec<LinkItem>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Layout {
    Grouped(Vec<Group>),
    Flat { items: Vec<LinkItem>, matrix: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub title: Option<String>,
    pub layout: Layout,
    pub extras: Option<Extras>,
}

impl Document {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn total_items(&self) -> usize {
        match &self.layout {
            Layout::Grouped(groups) => groups.iter().map(|g| g.items.len()).sum(),
            Layout::Flat { items, .. } => items.len(),
        }
    }
}

/// Only a top-level JSON object is a document.
impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        match Value::deserialize(d)? {
            v @ Value::Object(_) => RawDocument::deserialize(v)
                .map(Document::from)
                .map_err(D::Error::custom),
            other => Err(D::Error::custom(format!(
                "links document must be a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_groups")]
    groups: Option<Vec<Group>>,
    #[serde(default, deserialize_with = "lenient_items")]
    items: Vec<LinkItem>,
    #[serde(default, deserialize_with = "lenient_string")]
    layout: Option<String>,
    #[serde(default, deserialize_with = "lenient_extras")]
    extras: Option<Extras>,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        let layout = match raw.groups {
            Some(groups) => Layout::Grouped(groups),
            None => Layout::Flat {
                items: raw.items,
                matrix: raw.layout.as_deref() == Some("matrix"),
            },
        };
        Self {
            title: raw.title,
            layout,
            extras: raw.extras,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_to_string(Value::deserialize(d)?))
}

fn lenient_tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(values) => values.into_iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    })
}

fn lenient_pos<'de, D: Deserializer<'de>>(d: D) -> Result<Option<(u32, u32)>, D::Error> {
    let Value::Array(values) = Value::deserialize(d)? else {
        return Ok(None);
    };
    let cell = |v: &Value| {
        v.as_u64()
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
    };
    Ok(match values.as_slice() {
        [row, col] => cell(row).zip(cell(col)),
        _ => None,
    })
}

fn items_from(values: Vec<Value>) -> Vec<LinkItem> {
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .collect()
}

fn lenient_items<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<LinkItem>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(values) => items_from(values),
        _ => Vec::new(),
    })
}

fn lenient_groups<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<Group>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(values) => Some(
            values
                .into_iter()
                .map(|v| serde_json::from_value(v).unwrap_or_default())
                .collect(),
        ),
        Value::Null => None,
        _ => Some(Vec::new()),
    })
}

fn lenient_extras<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Extras>, D::Error> {
    Ok(match Value::deserialize(d)? {
        v @ Value::Object(_) => serde_json::from_value(v).ok(),
        _ => None,
    })
}
