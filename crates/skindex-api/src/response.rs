use serde::Deserialize;
use serde_json::Value;

use skindex_core::{Item, ItemCollection};

/// Body of `items/list`.
#[derive(Debug, Default, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub items: Option<ItemCollection>,
}

impl ListResponse {
    pub fn into_items(self) -> Vec<Item> {
        self.items.map(ItemCollection::into_flat).unwrap_or_default()
    }
}

/// Body of `items/get`: `{ "item": {..} }`, a bare item, or an absence
/// marker such as `{ "result": false }`.
pub fn parse_details(body: Value) -> Result<Item, serde_json::Error> {
    let Value::Object(mut map) = body else {
        return Ok(Item::default());
    };

    if map.get("result") == Some(&Value::Bool(false)) {
        return Ok(Item::default());
    }

    match map.remove("item") {
        Some(item @ Value::Object(_)) => serde_json::from_value(item),
        Some(_) => Ok(Item::default()),
        None if map.contains_key("id") || map.contains_key("name") => {
            serde_json::from_value(Value::Object(map))
        }
        None => Ok(Item::default()),
    }
}
