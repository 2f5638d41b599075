use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::record::Record;

/// A cosmetic returned by the catalog API.
///
/// Only the fields the tool displays are typed; everything else the API
/// returns is kept in `extra` so a stored selection is a full copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Tag>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Tag>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// The catalog answered but had no such item.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty()
    }

    /// `name (rarity)`, as shown in selection lists.
    pub fn label(&self) -> String {
        let rarity = self
            .rarity
            .as_ref()
            .map(Tag::to_string)
            .unwrap_or_else(|| "unknown".into());
        format!("{} ({rarity})", self.name)
    }

    pub fn to_data(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "item serialized to non-object: {other}"
            ))),
        }
    }

    /// Rebuild an item from a `selected_items` record.
    pub fn from_record(record: &Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record.clone().into_data()))
    }
}

/// `rarity` and `type` have been sent both as plain strings and as
/// `{ "id": .., "name": .. }` objects. Other keys of the object form are
/// kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    Plain(String),
    Named {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(s) => write!(f, "{s}"),
            Self::Named { name: Some(n), .. } => write!(f, "{n}"),
            Self::Named { id: Some(i), .. } => write!(f, "{i}"),
            Self::Named { .. } => write!(f, "unknown"),
        }
    }
}

/// The `items` payload of a list response: either one flat array or arrays
/// grouped by category.
///
/// Elements are decoded one by one; an element that is not a valid item is
/// logged and dropped instead of failing the whole payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawCollection")]
pub enum ItemCollection {
    Flat(Vec<Item>),
    Grouped(BTreeMap<String, Vec<Item>>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCollection {
    Flat(Vec<Value>),
    Grouped(BTreeMap<String, Vec<Value>>),
}

impl From<RawCollection> for ItemCollection {
    fn from(raw: RawCollection) -> Self {
        match raw {
            RawCollection::Flat(values) => Self::Flat(decode_items(values)),
            RawCollection::Grouped(groups) => Self::Grouped(
                groups
                    .into_iter()
                    .map(|(category, values)| (category, decode_items(values)))
                    .collect(),
            ),
        }
    }
}

fn decode_items(values: Vec<Value>) -> Vec<Item> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Item>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("skipping malformed catalog item: {e}");
                None
            }
        })
        .collect()
}

impl Default for ItemCollection {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl ItemCollection {
    /// Grouped items are concatenated in category-name order.
    pub fn into_flat(self) -> Vec<Item> {
        match self {
            Self::Flat(items) => items,
            Self::Grouped(groups) => groups.into_values().flatten().collect(),
        }
    }
}

/// Keep items whose name contains `keyword`, ignoring case.
pub fn filter_by_name(items: Vec<Item>, keyword: &str) -> Vec<Item> {
    let needle = keyword.trim().to_lowercase();
    items
        .into_iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .collect()
}
