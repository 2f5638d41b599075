use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field added to every record on insertion.
pub const ID_FIELD: &str = "_id";

/// Collection holding one `{ "keyword": .. }` record per searched keyword.
pub const SEARCH_HISTORY: &str = "search_history";

/// Collection holding full copies of the items a user picked.
pub const SELECTED_ITEMS: &str = "selected_items";

/// One stored JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Merge `id` into `data`. An `_id` already present in `data` is replaced.
    pub fn with_id(mut data: Map<String, Value>, id: String) -> Self {
        data.insert(ID_FIELD.to_string(), Value::String(id));
        Self { fields: data }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Fields without the generated `_id`.
    pub fn into_data(mut self) -> Map<String, Value> {
        self.fields.remove(ID_FIELD);
        self.fields
    }

    pub fn matches(&self, query: &Query) -> bool {
        self.fields.get(&query.field) == Some(&query.value)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Single-field equality filter. JSON values must be identical: `"1"` never
/// matches `1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub field: String,
    pub value: Value,
}

impl Query {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Record identifier: insertion time in unix millis plus a tie-breaker in
/// `[0, 1000)`. Two inserts in the same millisecond can still collide.
pub fn generate_id(unix_millis: i64, tie_breaker: u16) -> String {
    debug_assert!(tie_breaker < 1000);
    format!("{unix_millis}-{tie_breaker}")
}

/// Largest multiple of 1000 representable in a `u32`; draws at or above it
/// are rejected so the reduction stays uniform.
const TIE_BREAKER_ZONE: u32 = u32::MAX - u32::MAX % 1000;

/// Map a uniform random `u32` onto `[0, 1000)`, or `None` if the draw must be
/// retried.
pub fn tie_breaker(draw: u32) -> Option<u16> {
    (draw < TIE_BREAKER_ZONE).then(|| (draw % 1000) as u16)
}
