use serde_json::{Map, Value};

use crate::error::StoreResult;
use crate::record::{Query, Record};

pub trait RecordStore {
    /// Append `data` to `collection` under a freshly generated `_id`.
    fn insert(&self, collection: &str, data: Map<String, Value>) -> StoreResult<Record>;

    /// Every record in storage order, or only those matching `query`.
    fn find(&self, collection: &str, query: Option<&Query>) -> StoreResult<Vec<Record>>;
}
