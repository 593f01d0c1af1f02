//! Display-ready sidebar model.
//!
//! Merges the grouped sections with the current page and the persisted
//! expanded-folder set. Folder expansion is keyed by slug (`nodes/llm`).

use folio_config::NavigationConfig;
use serde::Serialize;

use crate::entry::DocumentEntry;
use crate::sections::PriorityGroup;

/// One sidebar section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarSection {
    pub title: String,
    pub icon: String,
    /// Open if configured so, or if it holds the current page.
    pub expanded: bool,
    pub items: Vec<SidebarItem>,
}

/// One link or folder in a section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// URL path, `/` + slug.
    pub href: String,
    /// Expansion key for folders.
    pub key: String,
    pub active: bool,
    pub is_container: bool,
    /// Always false for documents.
    pub expanded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SidebarItem>,
}

impl SidebarItem {
    fn contains_active(&self) -> bool {
        self.active || self.children.iter().any(Self::contains_active)
    }
}

/// Build the sidebar for `current` (a slug, with or without slashes).
pub fn build_sidebar(
    groups: &[PriorityGroup],
    navigation: &NavigationConfig,
    current: &str,
    is_expanded: impl Fn(&str) -> bool,
) -> Vec<SidebarSection> {
    let current = current.trim_matches('/');
    groups
        .iter()
        .map(|group| {
            let items: Vec<SidebarItem> = group
                .entries
                .iter()
                .map(|entry| item(entry, navigation, current, &is_expanded))
                .collect();
            SidebarSection {
                title: group.title.clone(),
                icon: group.icon.clone(),
                expanded: group.default_expanded || items.iter().any(SidebarItem::contains_active),
                items,
            }
        })
        .collect()
}

fn item(
    entry: &DocumentEntry,
    navigation: &NavigationConfig,
    current: &str,
    is_expanded: &impl Fn(&str) -> bool,
) -> SidebarItem {
    let key = entry.key();
    let icon = entry
        .source_path
        .file_name()
        .and_then(|name| navigation.item(&name.to_string_lossy()).cloned())
        .map(|item| item.icon)
        .filter(|icon| !icon.is_empty());

    SidebarItem {
        label: entry.name.clone(),
        icon,
        href: format!("/{key}"),
        active: key == current,
        is_container: entry.is_container,
        expanded: entry.is_container && is_expanded(&key),
        children: entry
            .children
            .iter()
            .map(|child| item(child, navigation, current, is_expanded))
            .collect(),
        key,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn doc(slug: &str, file: &str) -> DocumentEntry {
        DocumentEntry {
            name: slug.rsplit('/').next().unwrap_or_default().to_owned(),
            slug: slug.split('/').map(str::to_owned).collect(),
            source_path: PathBuf::from("/docs").join(file),
            is_container: false,
            children: Vec::new(),
        }
    }

    fn groups() -> Vec<PriorityGroup> {
        let nodes = DocumentEntry {
            name: "Nodes".to_owned(),
            is_container: true,
            children: vec![
                doc("nodes/README", "nodes/README.md"),
                DocumentEntry {
                    is_container: true,
                    children: vec![doc("nodes/llm/chat", "nodes/llm/chat.md")],
                    ..doc("nodes/llm", "nodes/llm")
                },
            ],
            ..doc("nodes", "nodes")
        };
        vec![
            PriorityGroup {
                title: "Getting Started".to_owned(),
                icon: "🚀".to_owned(),
                entries: vec![doc("OVERVIEW", "OVERVIEW.md")],
                default_expanded: true,
            },
            PriorityGroup {
                title: "Node Reference".to_owned(),
                icon: "🧩".to_owned(),
                entries: vec![nodes],
                default_expanded: false,
            },
        ]
    }

    #[test]
    fn test_icons_and_hrefs() {
        let sidebar = build_sidebar(&groups(), &NavigationConfig::default(), "", |_| false);

        let overview = &sidebar[0].items[0];
        assert_eq!(overview.icon.as_deref(), Some("📋"));
        assert_eq!(overview.href, "/OVERVIEW");
        assert!(!overview.active);
        assert_eq!(sidebar[1].items[0].icon.as_deref(), Some("🧩"));
        assert_eq!(sidebar[1].items[0].children[0].icon, None);
    }

    #[test]
    fn test_expansion_from_store() {
        let open: HashSet<&str> = HashSet::from(["nodes/llm", "OVERVIEW"]);
        let sidebar = build_sidebar(&groups(), &NavigationConfig::default(), "", |key| {
            open.contains(key)
        });

        let nodes = &sidebar[1].items[0];
        assert!(!nodes.expanded);
        assert!(nodes.children[1].expanded);
        // Documents never expand even if their key is in the set.
        assert!(!sidebar[0].items[0].expanded);
    }

    #[test]
    fn test_active_page_opens_section() {
        let sidebar = build_sidebar(
            &groups(),
            &NavigationConfig::default(),
            "/nodes/llm/chat/",
            |_| false,
        );

        assert!(sidebar[1].expanded);
        assert!(sidebar[1].items[0].children[1].children[0].active);
        assert!(!sidebar[1].items[0].active);
    }

    #[test]
    fn test_collapsed_section_without_active_page() {
        let sidebar = build_sidebar(&groups(), &NavigationConfig::default(), "OVERVIEW", |_| {
            false
        });

        assert!(sidebar[0].expanded);
        assert!(!sidebar[1].expanded);
        assert!(sidebar[0].items[0].active);
    }
}
