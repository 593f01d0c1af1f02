//! Document tree building.
//!
//! Walks a [`Storage`] root and produces an ordered hierarchy of
//! [`DocumentEntry`] values. Ordering at every level:
//!
//! 1. inside the reference folder (any folder whose slug contains the
//!    configured `nodes_dir`), the overview file comes first;
//! 2. entries named in the priority configuration, in configured order;
//! 3. everything else, by name (byte order, case-sensitive).
//!
//! Only files with the document extension are documents; other files are
//! ignored. A folder that cannot be listed (permission error, symlink cycle)
//! is logged and left out; its siblings are unaffected.

use std::collections::HashSet;
use std::path::Path;

use folio_config::NavigationConfig;
use folio_storage::{Storage, StorageEntry, StorageError};

use crate::entry::DocumentEntry;

/// Folders nested deeper than this are not descended into.
const MAX_DEPTH: usize = 32;

/// Error returned when the tree cannot be built at all.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The document root itself cannot be listed.
    #[error("Cannot list document root: {0}")]
    Root(#[source] StorageError),
}

/// Builds the document tree from a [`Storage`].
pub struct TreeBuilder<'a> {
    storage: &'a dyn Storage,
    navigation: &'a NavigationConfig,
    extension: &'a str,
}

/// Sort position of a sibling; compared lexicographically.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Rank<'a> {
    Overview,
    Priority(usize),
    Natural(&'a str),
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder.
    ///
    /// `extension` is the document extension without the dot (`md`).
    #[must_use]
    pub fn new(
        storage: &'a dyn Storage,
        navigation: &'a NavigationConfig,
        extension: &'a str,
    ) -> Self {
        Self {
            storage,
            navigation,
            extension,
        }
    }

    /// Build the tree.
    ///
    /// An empty root yields an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Root`] if the root cannot be listed. Failures
    /// below the root only drop the affected subtree.
    pub fn build(&self) -> Result<Vec<DocumentEntry>, TreeError> {
        let entries = self.build_dir(Path::new(""), &[], 0).map_err(TreeError::Root)?;
        tracing::debug!(root = %self.storage.root().display(), entries = entries.len(), "Built document tree");
        Ok(entries)
    }

    fn build_dir(
        &self,
        dir: &Path,
        slug: &[String],
        depth: usize,
    ) -> Result<Vec<DocumentEntry>, StorageError> {
        let mut listed = self.storage.list(dir)?;
        let in_nodes = slug.iter().any(|segment| *segment == self.navigation.nodes_dir);
        listed.sort_by(|a, b| {
            self.rank(&a.name, in_nodes)
                .cmp(&self.rank(&b.name, in_nodes))
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut seen = HashSet::new();
        // Folders win slug collisions with documents (`guide/` vs `guide.md`).
        let folders_first = listed
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_dir)
            .chain(listed.iter().enumerate().filter(|(_, e)| !e.is_dir));

        let mut built: Vec<(usize, DocumentEntry)> = Vec::with_capacity(listed.len());
        for (position, item) in folders_first {
            let Some(entry) = self.build_entry(item, slug, depth, in_nodes) else {
                continue;
            };
            if !seen.insert(entry.tail().to_owned()) {
                tracing::warn!(
                    path = %item.path.display(),
                    slug = %entry.key(),
                    "Document shadowed by folder with the same slug"
                );
                continue;
            }
            built.push((position, entry));
        }

        built.sort_by_key(|(position, _)| *position);
        Ok(built.into_iter().map(|(_, entry)| entry).collect())
    }

    fn build_entry(
        &self,
        item: &StorageEntry,
        parent_slug: &[String],
        depth: usize,
        in_nodes: bool,
    ) -> Option<DocumentEntry> {
        if item.is_dir {
            return self.build_folder(item, parent_slug, depth);
        }

        let stem = self.document_stem(&item.name)?;
        let name = if in_nodes && item.name == self.navigation.overview_file {
            self.navigation.overview_label.clone()
        } else {
            self.label(&item.name, stem)
        };

        Some(DocumentEntry {
            name,
            slug: child_slug(parent_slug, stem),
            source_path: self.storage.root().join(&item.path),
            is_container: false,
            children: Vec::new(),
        })
    }

    fn build_folder(
        &self,
        item: &StorageEntry,
        parent_slug: &[String],
        depth: usize,
    ) -> Option<DocumentEntry> {
        let slug = child_slug(parent_slug, &item.name);
        if depth + 1 > MAX_DEPTH {
            tracing::warn!(path = %item.path.display(), "Folder nested too deeply, skipping");
            return None;
        }

        match self.build_dir(&item.path, &slug, depth + 1) {
            Ok(children) => Some(DocumentEntry {
                name: self.label(&item.name, &item.name),
                slug,
                source_path: self.storage.root().join(&item.path),
                is_container: true,
                children,
            }),
            Err(e) => {
                tracing::warn!(path = %item.path.display(), error = %e, "Skipping folder that cannot be listed");
                None
            }
        }
    }

    fn rank<'n>(&self, name: &'n str, in_nodes: bool) -> Rank<'n> {
        if in_nodes && name == self.navigation.overview_file {
            return Rank::Overview;
        }
        match self.navigation.priority_rank(name) {
            Some(rank) => Rank::Priority(rank),
            None => Rank::Natural(name),
        }
    }

    /// Configured label for `file`, or `fallback`.
    fn label(&self, file: &str, fallback: &str) -> String {
        self.navigation
            .item(file)
            .map_or_else(|| fallback.to_owned(), |item| item.label.clone())
    }

    /// File name without the document extension, or `None` for non-documents.
    fn document_stem<'n>(&self, name: &'n str) -> Option<&'n str> {
        let stem = name.strip_suffix(self.extension)?.strip_suffix('.')?;
        (!stem.is_empty()).then_some(stem)
    }
}

fn child_slug(parent: &[String], segment: &str) -> Vec<String> {
    let mut slug = Vec::with_capacity(parent.len() + 1);
    slug.extend_from_slice(parent);
    slug.push(segment.to_owned());
    slug
}

#[cfg(test)]
mod tests {
    use folio_config::{PriorityGroupConfig, PriorityItem};
    use folio_storage::{MockStorage, StorageErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn build(storage: &MockStorage) -> Vec<DocumentEntry> {
        let nav = NavigationConfig::default();
        TreeBuilder::new(storage, &nav, "md").build().unwrap()
    }

    fn names(entries: &[DocumentEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn keys(entries: &[DocumentEntry]) -> Vec<String> {
        entries.iter().map(DocumentEntry::key).collect()
    }

    #[test]
    fn test_empty_root() {
        assert!(build(&MockStorage::new()).is_empty());
    }

    #[test]
    fn test_priority_file_first_then_alphabetical() {
        let storage = MockStorage::new()
            .with_file("ZETA.md", "")
            .with_file("OVERVIEW.md", "")
            .with_file("ALPHA.md", "");

        let tree = build(&storage);

        assert_eq!(keys(&tree), vec!["OVERVIEW", "ALPHA", "ZETA"]);
        assert_eq!(names(&tree), vec!["Overview", "ALPHA", "ZETA"]);
    }

    #[test]
    fn test_priority_items_follow_configured_order() {
        let storage = MockStorage::new()
            .with_file("DEV.md", "")
            .with_file("ARCHITECTURE.md", "")
            .with_file("OVERVIEW.md", "")
            .with_file("nodes/http.md", "")
            .with_file("CHANGELOG.md", "");

        let tree = build(&storage);

        assert_eq!(
            keys(&tree),
            vec!["OVERVIEW", "ARCHITECTURE", "DEV", "nodes", "CHANGELOG"]
        );
        assert_eq!(names(&tree)[3], "Nodes");
        assert!(tree[3].is_container);
    }

    #[test]
    fn test_natural_order_is_case_sensitive() {
        let storage = MockStorage::new()
            .with_file("beta.md", "")
            .with_file("Alpha.md", "")
            .with_file("alpha.md", "");

        assert_eq!(keys(&build(&storage)), vec!["Alpha", "alpha", "beta"]);
    }

    #[test]
    fn test_readme_first_in_nodes_folder() {
        let storage = MockStorage::new()
            .with_file("nodes/aaa.md", "")
            .with_file("nodes/README.md", "")
            .with_file("nodes/AAA.md", "")
            .with_file("nodes/llm/README.md", "")
            .with_file("nodes/llm/0-basics.md", "");

        let tree = build(&storage);
        let nodes = &tree[0].children;

        assert_eq!(
            keys(nodes),
            vec!["nodes/README", "nodes/AAA", "nodes/aaa", "nodes/llm"]
        );
        assert_eq!(nodes[0].name, "Overview");
        assert_eq!(
            keys(&nodes[3].children),
            vec!["nodes/llm/README", "nodes/llm/0-basics"]
        );
    }

    #[test]
    fn test_readme_outside_nodes_sorts_naturally() {
        let storage = MockStorage::new()
            .with_file("guide/ABOUT.md", "")
            .with_file("guide/README.md", "");

        let tree = build(&storage);

        assert_eq!(keys(&tree[0].children), vec!["guide/ABOUT", "guide/README"]);
        assert_eq!(tree[0].children[1].name, "README");
    }

    #[test]
    fn test_non_documents_ignored() {
        let storage = MockStorage::new()
            .with_file("OVERVIEW.md", "")
            .with_file("diagram.png", "")
            .with_file("notes.txt", "")
            .with_file(".md", "")
            .with_file("md", "");

        assert_eq!(keys(&build(&storage)), vec!["OVERVIEW"]);
    }

    #[test]
    fn test_children_extend_parent_slug() {
        let storage = MockStorage::new().with_file("a/b/c.md", "");

        let tree = build(&storage);
        let b = &tree[0].children[0];

        assert_eq!(tree[0].slug, vec!["a"]);
        assert_eq!(b.slug, vec!["a", "b"]);
        assert_eq!(b.children[0].slug, vec!["a", "b", "c"]);
        assert!(b.children[0].children.is_empty());
        assert_eq!(b.children[0].source_path, Path::new("mock://").join("a/b/c.md"));
    }

    #[test]
    fn test_empty_folder_kept() {
        let storage = MockStorage::new().with_dir("drafts");

        let tree = build(&storage);

        assert_eq!(keys(&tree), vec!["drafts"]);
        assert!(tree[0].is_container);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_folder_wins_slug_collision() {
        let storage = MockStorage::new()
            .with_file("guide.md", "")
            .with_file("guide/intro.md", "");

        let tree = build(&storage);

        assert_eq!(keys(&tree), vec!["guide"]);
        assert!(tree[0].is_container);
    }

    #[test]
    fn test_failing_subtree_is_omitted() {
        let storage = MockStorage::new()
            .with_file("OVERVIEW.md", "")
            .with_file("loop/a.md", "")
            .with_file("ok/b.md", "")
            .with_list_error("loop", StorageErrorKind::Cycle);

        let tree = build(&storage);

        assert_eq!(keys(&tree), vec!["OVERVIEW", "ok"]);
        assert_eq!(keys(&tree[1].children), vec!["ok/b"]);
    }

    #[test]
    fn test_root_failure_is_error() {
        let storage = MockStorage::new().with_list_error("", StorageErrorKind::PermissionDenied);
        let nav = NavigationConfig::default();

        let err = TreeBuilder::new(&storage, &nav, "md").build().unwrap_err();

        assert!(err.to_string().contains("Permission denied"));
    }

    #[test]
    fn test_custom_extension_and_labels() {
        let nav = NavigationConfig {
            groups: vec![PriorityGroupConfig {
                title: "Start".to_owned(),
                icon: String::new(),
                default_expanded: true,
                items: vec![PriorityItem {
                    file: "intro.markdown".to_owned(),
                    label: "Introduction".to_owned(),
                    icon: String::new(),
                }],
            }],
            ..NavigationConfig::default()
        };
        let storage = MockStorage::new()
            .with_file("zz.markdown", "")
            .with_file("intro.markdown", "")
            .with_file("skip.md", "");

        let tree = TreeBuilder::new(&storage, &nav, "markdown").build().unwrap();

        assert_eq!(names(&tree), vec!["Introduction", "zz"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let storage = MockStorage::new()
            .with_file("b.md", "")
            .with_file("a/x.md", "")
            .with_file("OVERVIEW.md", "");

        assert_eq!(build(&storage), build(&storage));
    }

    #[cfg(unix)]
    #[test]
    fn test_fs_symlink_cycle_skips_subtree() {
        use folio_storage::FsStorage;

        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("a")).unwrap();
        std::fs::write(tmp.path().join("a/doc.md"), "").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("a"), tmp.path().join("a/again")).unwrap();

        let storage = FsStorage::new(tmp.path().to_path_buf());
        let nav = NavigationConfig::default();
        let tree = TreeBuilder::new(&storage, &nav, "md").build().unwrap();

        assert_eq!(keys(&tree), vec!["a"]);
        assert_eq!(keys(&tree[0].children), vec!["a/doc"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_fs_file_symlink_outside_root_is_not_a_document() {
        use folio_storage::FsStorage;

        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "TOP SECRET").unwrap();
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("doc.md"), "").unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), tmp.path().join("leak.md"))
            .unwrap();

        let storage = FsStorage::new(tmp.path().to_path_buf());
        let nav = NavigationConfig::default();
        let tree = TreeBuilder::new(&storage, &nav, "md").build().unwrap();

        assert_eq!(keys(&tree), vec!["doc"]);
    }
}
