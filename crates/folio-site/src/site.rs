//! Site facade.
//!
//! [`Site`] ties a [`Storage`] to the navigation configuration: it serves the
//! document tree (through the process-wide [`TreeCache`]), the grouped
//! sections, the list of addressable slugs, and individual pages.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_config::{Config, NavigationConfig};
use folio_storage::{Storage, StorageError, StorageErrorKind};

use crate::cache::{SharedTree, TreeCache, TreeKey};
use crate::entry::DocumentEntry;
use crate::sections::{PriorityGroup, group_entries};
use crate::tree::{TreeBuilder, TreeError};

/// Configuration for [`Site`].
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Priority and reference-folder configuration.
    pub navigation: NavigationConfig,
    /// Document extension without the dot.
    pub extension: String,
    /// Slug served for an empty request.
    pub default_page: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            navigation: NavigationConfig::default(),
            extension: "md".to_owned(),
            default_page: "OVERVIEW".to_owned(),
        }
    }
}

impl From<&Config> for SiteConfig {
    fn from(config: &Config) -> Self {
        Self {
            navigation: config.navigation.clone(),
            extension: config.docs_resolved.extension.clone(),
            default_page: config.docs_resolved.default_page.clone(),
        }
    }
}

/// A document read from storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Normalized slug (default page resolved).
    pub slug: String,
    /// Backing file.
    pub source_path: PathBuf,
    /// Raw document text.
    pub content: String,
}

/// Error returned when a page cannot be served.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// No document backs this slug.
    #[error("Page not found: {0}")]
    NotFound(String),
    /// The document exists but could not be read.
    #[error("Cannot read page {slug}: {source}")]
    Storage {
        /// Requested slug.
        slug: String,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
}

/// Document site over a storage root.
pub struct Site {
    storage: Arc<dyn Storage>,
    config: SiteConfig,
    trees: Arc<TreeCache>,
}

impl Site {
    /// Create a site using the process-wide tree cache.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: SiteConfig) -> Self {
        Self {
            storage,
            config,
            trees: TreeCache::global(),
        }
    }

    /// Use a dedicated tree cache instead of the process-wide one.
    #[must_use]
    pub fn with_tree_cache(mut self, trees: Arc<TreeCache>) -> Self {
        self.trees = trees;
        self
    }

    /// Site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Ordered document tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the document root cannot be listed.
    pub fn tree(&self) -> Result<SharedTree, TreeError> {
        let key = TreeKey::new(
            self.storage.root(),
            &self.config.extension,
            &self.config.navigation,
        );
        self.trees.get_or_build(&key, || {
            TreeBuilder::new(
                self.storage.as_ref(),
                &self.config.navigation,
                &self.config.extension,
            )
            .build()
        })
    }

    /// Display sections derived from the tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the document root cannot be listed.
    pub fn sections(&self) -> Result<Vec<PriorityGroup>, TreeError> {
        let tree = self.tree()?;
        Ok(group_entries(
            &tree,
            &self.config.navigation,
            &self.config.extension,
        ))
    }

    /// Every addressable slug: the empty (default) slug, then every document
    /// in tree order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the document root cannot be listed.
    pub fn slugs(&self) -> Result<Vec<String>, TreeError> {
        let tree = self.tree()?;
        let mut slugs = vec![String::new()];
        for root in tree.iter() {
            root.walk(&mut |entry: &DocumentEntry| {
                if !entry.is_container {
                    slugs.push(entry.key());
                }
            });
        }
        Ok(slugs)
    }

    /// Read the page for `slug`.
    ///
    /// An empty slug serves the default page. A folder slug serves the
    /// folder's overview file.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NotFound`] if no document backs the slug (or the
    /// slug tries to leave the root), [`PageError::Storage`] on read failure.
    pub fn page(&self, slug: &str) -> Result<Page, PageError> {
        let trimmed = slug.trim_matches('/');
        let slug = if trimmed.is_empty() {
            self.config.default_page.as_str()
        } else {
            trimmed
        };
        if slug
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(PageError::NotFound(slug.to_owned()));
        }

        let document = PathBuf::from(format!("{slug}.{}", self.config.extension));
        let overview = Path::new(slug).join(&self.config.navigation.overview_file);

        for candidate in [document, overview] {
            match self.storage.read(&candidate) {
                Ok(content) => {
                    return Ok(Page {
                        slug: slug.to_owned(),
                        source_path: self.storage.root().join(&candidate),
                        content,
                    });
                }
                Err(e) if is_missing(&e) => {}
                Err(e) => {
                    return Err(PageError::Storage {
                        slug: slug.to_owned(),
                        source: e,
                    });
                }
            }
        }

        tracing::debug!(%slug, "Page not found");
        Err(PageError::NotFound(slug.to_owned()))
    }
}

fn is_missing(error: &StorageError) -> bool {
    matches!(
        error.kind(),
        StorageErrorKind::NotFound | StorageErrorKind::InvalidPath
    )
}

#[cfg(test)]
mod tests {
    use folio_storage::{FsStorage, MockStorage};
    use pretty_assertions::assert_eq;

    use super::*;

    fn site(storage: MockStorage) -> Site {
        Site::new(Arc::new(storage), SiteConfig::default())
            .with_tree_cache(Arc::new(TreeCache::new()))
    }

    #[test]
    fn test_page_reads_document() {
        let site = site(MockStorage::new().with_file("guide/setup.md", "# Setup"));

        let page = site.page("guide/setup").unwrap();

        assert_eq!(page.slug, "guide/setup");
        assert_eq!(page.content, "# Setup");
        assert_eq!(page.source_path, Path::new("mock://").join("guide/setup.md"));
    }

    #[test]
    fn test_empty_slug_serves_default_page() {
        let site = site(MockStorage::new().with_file("OVERVIEW.md", "# Overview"));

        assert_eq!(site.page("").unwrap().slug, "OVERVIEW");
        assert_eq!(site.page("/").unwrap().content, "# Overview");
    }

    #[test]
    fn test_folder_slug_serves_overview() {
        let site = site(MockStorage::new().with_file("nodes/README.md", "# Nodes"));

        assert_eq!(site.page("nodes/").unwrap().content, "# Nodes");
    }

    #[test]
    fn test_missing_page_is_not_found() {
        let site = site(MockStorage::new().with_file("OVERVIEW.md", ""));

        let err = site.page("missing").unwrap_err();

        assert!(matches!(err, PageError::NotFound(ref slug) if slug == "missing"));
        assert_eq!(err.to_string(), "Page not found: missing");
    }

    #[test]
    fn test_parent_segments_are_not_found() {
        let site = site(MockStorage::new().with_file("OVERVIEW.md", ""));

        assert!(matches!(site.page("../secret"), Err(PageError::NotFound(_))));
        assert!(matches!(site.page("a//b"), Err(PageError::NotFound(_))));
    }

    #[test]
    fn test_missing_page_does_not_affect_tree() {
        let site = site(
            MockStorage::new()
                .with_file("OVERVIEW.md", "")
                .with_file("DEV.md", ""),
        );

        assert!(site.page("nope").is_err());
        assert_eq!(site.tree().unwrap().len(), 2);
    }

    #[test]
    fn test_slugs_lists_documents() {
        let site = site(
            MockStorage::new()
                .with_file("OVERVIEW.md", "")
                .with_file("nodes/README.md", "")
                .with_file("nodes/http.md", "")
                .with_dir("empty"),
        );

        assert_eq!(
            site.slugs().unwrap(),
            vec!["", "OVERVIEW", "nodes/README", "nodes/http"]
        );
    }

    #[test]
    fn test_sections_use_tree() {
        let site = site(
            MockStorage::new()
                .with_file("OVERVIEW.md", "")
                .with_file("misc.md", ""),
        );

        let sections = site.sections().unwrap();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Getting Started");
        assert_eq!(sections[1].entries[0].key(), "misc");
    }

    #[test]
    fn test_tree_is_cached_per_root() {
        let storage = Arc::new(MockStorage::new().with_file("a.md", ""));
        let trees = Arc::new(TreeCache::new());
        let site = Site::new(Arc::clone(&storage) as Arc<dyn Storage>, SiteConfig::default())
            .with_tree_cache(trees);

        let first = site.tree().unwrap();
        storage.set_file("b.md", "");
        let second = site.tree().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_sites_with_different_extensions_do_not_share_trees() {
        let storage: Arc<dyn Storage> = Arc::new(
            MockStorage::new()
                .with_file("a.md", "")
                .with_file("b.markdown", ""),
        );
        let trees = Arc::new(TreeCache::new());
        let md = Site::new(Arc::clone(&storage), SiteConfig::default())
            .with_tree_cache(Arc::clone(&trees));
        let markdown = Site::new(
            storage,
            SiteConfig {
                extension: "markdown".to_owned(),
                ..SiteConfig::default()
            },
        )
        .with_tree_cache(trees);

        assert_eq!(md.tree().unwrap()[0].name, "a");
        assert_eq!(markdown.tree().unwrap()[0].name, "b");
    }

    #[test]
    fn test_fs_site_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("OVERVIEW.md"), "# Hi").unwrap();
        std::fs::write(tmp.path().join("ALPHA.md"), "").unwrap();
        std::fs::write(tmp.path().join("ZETA.md"), "").unwrap();

        let site = Site::new(
            Arc::new(FsStorage::new(tmp.path().to_path_buf())),
            SiteConfig::default(),
        )
        .with_tree_cache(Arc::new(TreeCache::new()));

        let keys: Vec<_> = site.tree().unwrap().iter().map(DocumentEntry::key).collect();
        assert_eq!(keys, vec!["OVERVIEW", "ALPHA", "ZETA"]);
        assert_eq!(site.page("").unwrap().content, "# Hi");
    }
}
