//! Record trait and filter types
//!
//! A `Record` is anything the store can persist: serde round-trippable,
//! keyed by collection + id, with a small set of indexed fields that
//! equality filters can match against.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A persistable document
pub trait Record: Serialize + DeserializeOwned {
    /// Document id, unique within the collection
    fn id(&self) -> &str;

    /// Last-update timestamp (Unix milliseconds)
    fn updated_at(&self) -> i64;

    /// Collection this record belongs to
    fn collection_name() -> &'static str;

    /// Fields exposed to equality filters
    fn indexed_fields(&self) -> HashMap<String, IndexValue>;
}

/// Value of an indexed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexValue {
    String(String),
    Bool(bool),
    Int(i64),
}

impl From<&str> for IndexValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for IndexValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for IndexValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// Filter operator
///
/// The store deliberately supports equality only. Anything richer is
/// done by the caller after the query, which keeps the interface
/// honest about what a hosted document backend indexes by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
}

/// A single equality filter over an indexed field
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: IndexValue,
}

impl Filter {
    /// Shorthand for the only supported operator
    pub fn eq(field: impl Into<String>, value: impl Into<IndexValue>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    /// Whether a record's indexed fields satisfy this filter
    pub fn matches(&self, fields: &HashMap<String, IndexValue>) -> bool {
        match self.op {
            FilterOp::Eq => fields.get(&self.field) == Some(&self.value),
        }
    }
}
