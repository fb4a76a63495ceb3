//! # everbloom-store
//!
//! Persistence layer for Everbloom.
//!
//! Everything the application remembers lives in one SQLite file, one row
//! per namespace. Three abstractions stack on top of each other:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  ContentCache<T>   (key → generated content)  │
//! ├──────────────────────────────────────────────┤
//! │  StateCell<T>      (typed value + default)    │
//! ├──────────────────────────────────────────────┤
//! │  Store             (namespaces, export/import │
//! │                     /wipe, fail-soft reads)   │
//! ├──────────────────────────────────────────────┤
//! │  Database          (rusqlite WAL, blocking    │
//! │                     pool dispatch, migrations)│
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use everbloom_store::{ContentCache, Database, StateCell, Store};
//!
//! let db = Database::open_and_migrate("data/everbloom.db").await?;
//! let store = Store::new(db);
//! let prefs = StateCell::new(store.clone(), "prefs", 1, Prefs::default);
//! let plants: ContentCache<PlantProfile> = ContentCache::new(store, "catalog.plants", 1);
//! ```

pub mod cell;
pub mod content_cache;
pub mod db;
pub mod error;
pub mod migration;
pub mod store;

// ── re-exports ───────────────────────────────────────────────────────

pub use cell::StateCell;
pub use content_cache::{CacheEntry, ContentCache};
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use store::{ExportBundle, FORMAT_VERSION, NamespaceRecord, Store};
