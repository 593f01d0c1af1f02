//! Document tree and navigation model for folio.
//!
//! # Architecture
//!
//! - [`TreeBuilder`]: walks a [`folio_storage::Storage`] root into an ordered
//!   [`DocumentEntry`] hierarchy using the priority configuration
//! - [`group_entries`]: derives [`PriorityGroup`] display sections
//! - [`TreeCache`]: process-wide cache of built trees, keyed by root
//! - [`Site`]: tree, sections, slugs and page lookup over one storage
//! - [`build_sidebar`]: display-ready sections merged with expansion state
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_site::{Site, SiteConfig};
//! use folio_storage::FsStorage;
//!
//! let site = Site::new(Arc::new(FsStorage::new("docs".into())), SiteConfig::default());
//! for section in site.sections()? {
//!     println!("{} {}", section.icon, section.title);
//! }
//! ```

mod cache;
mod entry;
mod sections;
mod sidebar;
mod site;
mod tree;

pub use cache::{SharedTree, TreeCache, TreeKey};
pub use entry::DocumentEntry;
pub use sections::{OTHER_TITLE, PriorityGroup, group_entries};
pub use sidebar::{SidebarItem, SidebarSection, build_sidebar};
pub use site::{Page, PageError, Site, SiteConfig};
pub use tree::{TreeBuilder, TreeError};
