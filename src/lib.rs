//! # SnapKV - An Embedded Key-Value Store with Snapshot Persistence
//!
//! SnapKV is an in-process key-value store for structured (JSON) values.
//! Entries can expire after a time-to-live, and the whole store is mirrored
//! to a single JSON snapshot file so it survives restarts.
//!
//! ## Features
//!
//! - **Create-Only Writes**: Keys are never overwritten; duplicates are rejected
//! - **Durable on Return**: Every successful mutation is written to disk first
//! - **TTL Support**: Entries expire a number of seconds after creation
//! - **All-or-Nothing Batches**: Up to 100 entries validated and applied together
//! - **Lazy + Active Expiry**: Expired entries are removed on read and by a sweeper
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               Store                                     │
//! │                                                                         │
//! │  create / read / remove / batch_create                                  │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  ┌──────────────────────────────────────────────┐   ┌────────────────┐  │
//! │  │              StorageEngine                   │──>│   Snapshot     │  │
//! │  │   Mutex<HashMap<String, ValueEntry>>         │   │  (JSON file)   │  │
//! │  └──────────────────────────────────────────────┘   └────────────────┘  │
//! │                ▲                                                        │
//! │                │                                                        │
//! │  ┌─────────────┴───────────────────────────────────┐                    │
//! │  │           ExpirySweeper                         │                    │
//! │  │      (Background Tokio Task)                    │                    │
//! │  └─────────────────────────────────────────────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use snapkv::Store;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), snapkv::StoreError> {
//!     let store = Store::open_path("datastore.json")?;
//!
//!     // Never expires
//!     store.create("user:1", json!({"name": "Alice"}), 0)?;
//!
//!     // Expires in 60 seconds
//!     store.create("session:1", json!("token123"), 60)?;
//!
//!     let user = store.read("user:1")?;
//!     println!("{}", user);
//!
//!     store.batch_create(
//!         vec![
//!             ("user:2".to_string(), json!({"name": "Bob"})),
//!             ("user:3".to_string(), json!({"name": "Charlie"})),
//!         ],
//!         0,
//!     )?;
//!
//!     store.remove("user:1")?;
//!     store.close()
//! }
//! ```
//!
//! ## Limits
//!
//! - Keys: at most 32 bytes of UTF-8
//! - Values: at most 16 KiB of compact JSON
//! - Batches: at most 100 entries
//! - Snapshot file: at most 1 GiB
//!
//! ## Design Highlights
//!
//! ### One Lock
//!
//! The map and the snapshot file are guarded by one mutex, held through the
//! snapshot write. Operations are totally ordered and a reader never sees a
//! partial batch. The cost is throughput: each write rewrites the whole file
//! while every other caller waits.
//!
//! ### Failure Model
//!
//! Validation errors leave the store unchanged. A failed snapshot write is
//! reported, but the in-memory change stays, so memory can be ahead of disk
//! until the next successful write. A snapshot that cannot be parsed stops
//! the store from opening rather than being replaced by an empty one.
//!
//! ## Module Overview
//!
//! - [`storage`]: Engine, entries, expiry policy, snapshot and sweeper
//! - [`config`]: Store configuration and size limits
//! - [`error`]: The error taxonomy

pub mod config;
pub mod error;
pub mod storage;
pub mod store;

// Re-export commonly used types for convenience
pub use config::{
    Limits, StoreConfig, BATCH_LIMIT, DEFAULT_SNAPSHOT_PATH, MAX_KEY_LENGTH, MAX_SNAPSHOT_SIZE,
    MAX_VALUE_SIZE,
};
pub use error::{StoreError, StoreResult};
pub use storage::{ExpirySweeper, StorageEngine, StorageStats, ValueEntry};
pub use store::Store;

/// Version of SnapKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
