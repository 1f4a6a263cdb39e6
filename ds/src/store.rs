//! In-memory document store with optional JSON-file persistence
//!
//! Collections of JSON documents keyed by id. Writes are last-writer
//! wins; there is no locking beyond the process-local RwLock. Batches
//! apply all their operations under a single write lock.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::record::{Filter, IndexValue, Record};

/// A stored document: the serialized record plus its index projection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    value: serde_json::Value,
    indexed: HashMap<String, IndexValue>,
    updated_at: i64,
}

type Collections = HashMap<String, HashMap<String, Document>>;

/// The document store
///
/// `Store::new()` is purely in-memory (tests); `Store::open(path)`
/// loads a JSON snapshot if one exists and writes it back after every
/// mutation.
pub struct Store {
    inner: RwLock<Collections>,
    path: Option<PathBuf>,
}

impl Store {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            path: None,
        }
    }

    /// Open a file-backed store, loading the snapshot if present
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let collections = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            HashMap::new()
        };

        debug!(path = %path.display(), "opened document store");
        Ok(Self {
            inner: RwLock::new(collections),
            path: Some(path),
        })
    }

    /// Insert or replace a record
    pub fn put<T: Record>(&self, record: &T) -> Result<(), StoreError> {
        let doc = Document {
            value: serde_json::to_value(record)?,
            indexed: record.indexed_fields(),
            updated_at: record.updated_at(),
        };

        {
            let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
            inner
                .entry(T::collection_name().to_string())
                .or_default()
                .insert(record.id().to_string(), doc);
        }

        self.sync()
    }

    /// Fetch a record by id
    pub fn get<T: Record>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let Some(doc) = inner.get(T::collection_name()).and_then(|c| c.get(id)) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(doc.value.clone())?))
    }

    /// Delete a record by id; returns whether it existed
    pub fn delete<T: Record>(&self, id: &str) -> Result<bool, StoreError> {
        let removed = {
            let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
            inner
                .get_mut(T::collection_name())
                .map(|c| c.remove(id).is_some())
                .unwrap_or(false)
        };

        self.sync()?;
        Ok(removed)
    }

    /// List records matching every given filter (equality over indexed fields)
    pub fn list<T: Record>(&self, filters: &[Filter]) -> Result<Vec<T>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let Some(collection) = inner.get(T::collection_name()) else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for doc in collection.values() {
            if filters.iter().all(|f| f.matches(&doc.indexed)) {
                records.push(serde_json::from_value(doc.value.clone())?);
            }
        }
        Ok(records)
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.inner
            .read()
            .map(|inner| inner.get(collection).map(|c| c.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    /// Apply a batch: every operation lands under one write lock
    pub fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let op_count = batch.ops.len();
        {
            let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
            for op in batch.ops {
                match op {
                    BatchOp::Put { collection, id, doc } => {
                        inner.entry(collection).or_default().insert(id, doc);
                    }
                    BatchOp::Delete { collection, id } => {
                        if let Some(c) = inner.get_mut(&collection) {
                            c.remove(&id);
                        }
                    }
                }
            }
        }

        debug!(op_count, "committed write batch");
        self.sync()
    }

    /// Write the snapshot back to disk (no-op for in-memory stores)
    fn sync(&self) -> Result<(), StoreError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let content = serde_json::to_string_pretty(&*inner)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

enum BatchOp {
    Put {
        collection: String,
        id: String,
        doc: Document,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// A batched multi-document write
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Queue an insert-or-replace
    pub fn put<T: Record>(&mut self, record: &T) -> Result<(), StoreError> {
        self.ops.push(BatchOp::Put {
            collection: T::collection_name().to_string(),
            id: record.id().to_string(),
            doc: Document {
                value: serde_json::to_value(record)?,
                indexed: record.indexed_fields(),
                updated_at: record.updated_at(),
            },
        });
        Ok(())
    }

    /// Queue a delete
    pub fn delete<T: Record>(&mut self, id: &str) {
        self.ops.push(BatchOp::Delete {
            collection: T::collection_name().to_string(),
            id: id.to_string(),
        });
    }
}

impl Default for WriteBatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Log a one-line summary of the store contents
pub fn log_summary(store: &Store, collections: &[&str]) {
    for name in collections {
        info!(collection = *name, count = store.count(name), "store contents");
    }
}
