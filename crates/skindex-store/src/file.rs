use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use skindex_core::{Record, StoreError, StoreResult};

/// Letters, digits, `_` and `-` only, so a name maps to exactly one file
/// inside the store directory.
pub fn validate_name(collection: &str) -> StoreResult<()> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::new(collection, "invalid collection name"))
    }
}

pub fn collection_path(dir: &Path, collection: &str) -> PathBuf {
    dir.join(format!("{collection}.json"))
}

/// Read the whole array. A missing file is an empty collection.
pub fn read_records(path: &Path, collection: &str) -> StoreResult<Vec<Record>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::new(collection, format!("cannot read: {e}"))),
    };

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::new(collection, format!("malformed JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(StoreError::new(collection, "file is not a JSON array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Object(map) => Ok(Record::from(map)),
            _ => Err(StoreError::new(
                collection,
                format!("element {i} is not an object"),
            )),
        })
        .collect()
}

/// Replace the collection file with `records`.
///
/// Data goes to a sibling `.tmp` file, is synced, then renamed over the
/// target so readers never see a half-written array.
pub fn write_records(path: &Path, collection: &str, records: &[Record]) -> StoreResult<()> {
    let bytes = serde_json::to_vec(records)
        .map_err(|e| StoreError::new(collection, format!("cannot serialize: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    };

    write().map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::new(collection, format!("cannot write: {e}"))
    })
}
