//! Storage Engine Module
//!
//! This module provides the core storage functionality for SnapKV: a locked
//! key-value map with TTL support, its JSON snapshot, and a background
//! expiry sweeper.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌───────────────────────────┐      ┌───────────────────┐   │
//! │  │ Mutex<HashMap<String,     │─────>│ Snapshot          │   │
//! │  │           ValueEntry>>    │      │ (datastore.json)  │   │
//! │  └───────────────────────────┘      └───────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │     ExpirySweeper         │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Single Lock**: Map and snapshot file change together, never interleaved
//! - **Durable Writes**: Every successful mutation is on disk before it returns
//! - **TTL Support**: Entries can expire a number of seconds after creation
//! - **Lazy Expiry**: Expired entries are removed when read
//! - **Active Expiry**: Background sweeper removes entries nobody reads
//!
//! ## Example
//!
//! ```no_run
//! use snapkv::storage::StorageEngine;
//! use snapkv::Limits;
//! use serde_json::json;
//!
//! let engine = StorageEngine::open("datastore.json", Limits::default())?;
//!
//! engine.create("name", json!("Ariz"), 0)?;
//! assert_eq!(engine.read("name")?, json!("Ariz"));
//!
//! // Create with TTL
//! engine.create("session", json!({"token": "abc123"}), 3600)?;
//! # Ok::<(), snapkv::StoreError>(())
//! ```

pub mod engine;
pub mod entry;
pub mod expiry;
pub mod snapshot;
pub mod sweeper;

// Re-export commonly used types
pub use engine::{StorageEngine, StorageStats};
pub use entry::ValueEntry;
pub use snapshot::{Snapshot, SnapshotError};
pub use sweeper::ExpirySweeper;
