use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use skindex_core::{
    generate_id, tie_breaker, Clock, Query, Record, RecordStore, StoreError, StoreResult,
    SystemClock,
};

use crate::file::{collection_path, read_records, validate_name, write_records};

/// Flat-file document store: one JSON array file per collection.
///
/// Inserts rewrite the whole file. There is no locking, so two processes
/// inserting into the same collection at once can lose a record.
pub struct JsonStore {
    dir: PathBuf,
    clock: Box<dyn Clock>,
}

impl JsonStore {
    pub fn open(dir: &Path) -> StoreResult<Self> {
        Self::with_clock(dir, Box::new(SystemClock))
    }

    pub fn with_clock(dir: &Path, clock: Box<dyn Clock>) -> StoreResult<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            StoreError::new(
                "*",
                format!("cannot create store directory {}: {e}", dir.display()),
            )
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            clock,
        })
    }

    fn path_for(&self, collection: &str) -> StoreResult<PathBuf> {
        validate_name(collection)?;
        Ok(collection_path(&self.dir, collection))
    }

    fn next_id(&self, collection: &str) -> StoreResult<String> {
        let salt = loop {
            let mut buf = [0u8; 4];
            getrandom::getrandom(&mut buf)
                .map_err(|e| StoreError::new(collection, format!("cannot generate id: {e}")))?;
            if let Some(salt) = tie_breaker(u32::from_le_bytes(buf)) {
                break salt;
            }
        };
        Ok(generate_id(self.clock.now_millis(), salt))
    }
}

impl RecordStore for JsonStore {
    fn insert(&self, collection: &str, data: Map<String, Value>) -> StoreResult<Record> {
        let path = self.path_for(collection)?;
        let mut records = read_records(&path, collection)?;

        let record = Record::with_id(data, self.next_id(collection)?);
        records.push(record.clone());
        write_records(&path, collection, &records)?;

        debug!(
            "inserted {} into {collection} ({} records)",
            record.id().unwrap_or_default(),
            records.len()
        );
        Ok(record)
    }

    fn find(&self, collection: &str, query: Option<&Query>) -> StoreResult<Vec<Record>> {
        let path = self.path_for(collection)?;
        let records = read_records(&path, collection)?;
        Ok(match query {
            Some(q) => records.into_iter().filter(|r| r.matches(q)).collect(),
            None => records,
        })
    }
}
