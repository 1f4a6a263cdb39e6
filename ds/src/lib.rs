//! DocStore - document-store collaborator interface
//!
//! The hosted backend this models exposes create/read/update/delete by
//! key, simple equality filters, and batched multi-document writes.
//! This crate is that interface plus an in-memory implementation with
//! an optional JSON snapshot on disk, so the core stays testable
//! without a live backend.
//!
//! # Example
//!
//! ```ignore
//! use docstore::{Filter, Store};
//!
//! let store = Store::open(".fieldops/store.json")?;
//! store.put(&team)?;
//! let free: Vec<Team> = store.list(&[Filter::eq("status", "free")])?;
//! ```

mod error;
mod record;
mod store;

pub use error::StoreError;
pub use record::{Filter, FilterOp, IndexValue, Record};
pub use store::{Store, WriteBatch, log_summary};

/// Current time as Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
