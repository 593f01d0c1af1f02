//! Persisted navigation state for folio.
//!
//! The sidebar's open folders survive across runs: [`NavigationStateStore`]
//! keeps an [`ExpandedFolderSet`] in memory and writes it, as a JSON array,
//! to an injected [`KeyValueStore`] after every toggle.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_nav::{FileStore, NavigationStateStore};
//!
//! let nav = NavigationStateStore::new(
//!     Arc::new(FileStore::new(".folio/state.json".into())),
//!     "folio-expanded-folders",
//! );
//! nav.load();
//! let open = nav.toggle("nodes/llm");
//! ```

mod kv;
mod state;

pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use state::{ExpandedFolderSet, NavigationStateStore};
