//! Document tree node.

use std::path::PathBuf;

use serde::Serialize;

/// A document or folder in the document tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentEntry {
    /// Display label.
    pub name: String,
    /// URL path segments; unique across the tree.
    pub slug: Vec<String>,
    /// Backing file or directory.
    pub source_path: PathBuf,
    /// True for folders.
    pub is_container: bool,
    /// Ordered children; always empty for documents.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentEntry>,
}

impl DocumentEntry {
    /// Slug joined with `/`, used as URL path and expansion key.
    #[must_use]
    pub fn key(&self) -> String {
        self.slug.join("/")
    }

    /// Last slug segment.
    #[must_use]
    pub fn tail(&self) -> &str {
        self.slug.last().map_or("", String::as_str)
    }

    /// Visit this entry and all descendants depth-first, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DocumentEntry)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
