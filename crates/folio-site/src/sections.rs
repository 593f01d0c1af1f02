//! Priority grouping.
//!
//! Derives display sections from the document tree using the priority
//! configuration. Each configured file is looked up by slug tail, with and
//! without the document extension; the shallowest match wins. Top-level
//! entries no group claimed are collected into a trailing "Other" section.

use std::collections::{HashSet, VecDeque};

use folio_config::{NavigationConfig, PriorityItem};
use serde::Serialize;

use crate::entry::DocumentEntry;

/// Title of the trailing catch-all section.
pub const OTHER_TITLE: &str = "Other";

const OTHER_ICON: &str = "📄";

/// A display section of the sidebar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriorityGroup {
    /// Section title.
    pub title: String,
    /// Section icon.
    pub icon: String,
    /// Entries in configured order (tree order for "Other").
    pub entries: Vec<DocumentEntry>,
    /// Whether the section starts expanded.
    pub default_expanded: bool,
}

/// Group `tree` into display sections.
///
/// Groups with no matching entries are omitted.
#[must_use]
pub fn group_entries(
    tree: &[DocumentEntry],
    navigation: &NavigationConfig,
    extension: &str,
) -> Vec<PriorityGroup> {
    let mut claimed = HashSet::new();
    let mut groups = Vec::with_capacity(navigation.groups.len() + 1);

    for config in &navigation.groups {
        let entries: Vec<DocumentEntry> = config
            .items
            .iter()
            .filter_map(|item| find_by_tail(tree, item, extension))
            .filter(|entry| claimed.insert(entry.key()))
            .cloned()
            .collect();

        if entries.is_empty() {
            tracing::debug!(group = %config.title, "No documents for group, omitting");
            continue;
        }
        groups.push(PriorityGroup {
            title: config.title.clone(),
            icon: config.icon.clone(),
            entries,
            default_expanded: config.default_expanded,
        });
    }

    let other: Vec<DocumentEntry> = tree
        .iter()
        .filter(|entry| !claimed.contains(&entry.key()))
        .cloned()
        .collect();
    if !other.is_empty() {
        groups.push(PriorityGroup {
            title: OTHER_TITLE.to_owned(),
            icon: OTHER_ICON.to_owned(),
            entries: other,
            default_expanded: false,
        });
    }

    groups
}

/// Breadth-first search for the shallowest entry whose slug tail matches
/// `item.file` as-is or with the document extension stripped.
fn find_by_tail<'a>(
    tree: &'a [DocumentEntry],
    item: &PriorityItem,
    extension: &str,
) -> Option<&'a DocumentEntry> {
    let stripped = item
        .file
        .strip_suffix(extension)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(&item.file);

    let mut queue: VecDeque<&DocumentEntry> = tree.iter().collect();
    while let Some(entry) = queue.pop_front() {
        let tail = entry.tail();
        if tail == item.file || tail == stripped {
            return Some(entry);
        }
        queue.extend(entry.children.iter());
    }
    None
}
