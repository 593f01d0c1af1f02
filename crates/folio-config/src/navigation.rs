//! Navigation and priority configuration.
//!
//! The priority configuration is an ordered list of groups, each listing
//! document files (or folders) with a display label and icon. The tree
//! builder flattens it into one ordering; the sidebar keeps the grouping.

use std::collections::HashSet;

use serde::Deserialize;

use crate::ConfigError;

/// One configured document or folder.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Hash)]
pub struct PriorityItem {
    /// File name (`OVERVIEW.md`) or folder name (`nodes`).
    pub file: String,
    /// Display label.
    pub label: String,
    /// Display icon.
    #[serde(default)]
    pub icon: String,
}

impl PriorityItem {
    fn new(file: &str, label: &str, icon: &str) -> Self {
        Self {
            file: file.to_owned(),
            label: label.to_owned(),
            icon: icon.to_owned(),
        }
    }
}

/// A titled group of priority items shown as one sidebar section.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Hash)]
pub struct PriorityGroupConfig {
    /// Section title.
    pub title: String,
    /// Section icon.
    #[serde(default)]
    pub icon: String,
    /// Whether the section starts expanded.
    #[serde(default = "default_true")]
    pub default_expanded: bool,
    /// Items in display order.
    #[serde(default)]
    pub items: Vec<PriorityItem>,
}

fn default_true() -> bool {
    true
}

/// `[navigation]` section.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct NavigationConfig {
    /// Key under which the expanded-folder set is persisted.
    pub state_key: String,
    /// Name of the reference folder whose overview file sorts first.
    pub nodes_dir: String,
    /// Overview file inside the reference folder.
    pub overview_file: String,
    /// Label used for the overview file.
    pub overview_label: String,
    /// Priority groups in display order.
    pub groups: Vec<PriorityGroupConfig>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            state_key: "folio-expanded-folders".to_owned(),
            nodes_dir: "nodes".to_owned(),
            overview_file: "README.md".to_owned(),
            overview_label: "Overview".to_owned(),
            groups: default_groups(),
        }
    }
}

impl NavigationConfig {
    /// All priority items across groups, in configured order.
    pub fn priority_items(&self) -> impl Iterator<Item = &PriorityItem> {
        self.groups.iter().flat_map(|group| group.items.iter())
    }

    /// Position of `name` in the flattened priority order, if configured.
    #[must_use]
    pub fn priority_rank(&self, name: &str) -> Option<usize> {
        self.priority_items().position(|item| item.file == name)
    }

    /// Configured item for `name`, if any.
    #[must_use]
    pub fn item(&self, name: &str) -> Option<&PriorityItem> {
        self.priority_items().find(|item| item.file == name)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.state_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "navigation.state_key cannot be empty".to_owned(),
            ));
        }
        if self.nodes_dir.is_empty() || self.overview_file.is_empty() {
            return Err(ConfigError::Validation(
                "navigation.nodes_dir and navigation.overview_file cannot be empty".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for item in self.priority_items() {
            if item.file.is_empty() {
                return Err(ConfigError::Validation(
                    "navigation.groups.items.file cannot be empty".to_owned(),
                ));
            }
            if !seen.insert(item.file.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "navigation.groups lists {} more than once",
                    item.file
                )));
            }
        }
        Ok(())
    }
}

/// Built-in priority groups.
fn default_groups() -> Vec<PriorityGroupConfig> {
    vec![
        PriorityGroupConfig {
            title: "Getting Started".to_owned(),
            icon: "🚀".to_owned(),
            default_expanded: true,
            items: vec![
                PriorityItem::new("OVERVIEW.md", "Overview", "📋"),
                PriorityItem::new("YAML_SPEC.md", "YAML Specification", "📝"),
                PriorityItem::new("NODE_SPEC.md", "Node Specification", "🔧"),
            ],
        },
        PriorityGroupConfig {
            title: "Development".to_owned(),
            icon: "⚙️".to_owned(),
            default_expanded: true,
            items: vec![
                PriorityItem::new("ARCHITECTURE.md", "Architecture", "🏗️"),
                PriorityItem::new("DEV.md", "Development Guide", "💻"),
                PriorityItem::new("CONTEXT_SYSTEM.md", "Context System", "🔗"),
            ],
        },
        PriorityGroupConfig {
            title: "Node Reference".to_owned(),
            icon: "🧩".to_owned(),
            default_expanded: true,
            items: vec![PriorityItem::new("nodes", "Nodes", "🧩")],
        },
        PriorityGroupConfig {
            title: "Resources".to_owned(),
            icon: "📚".to_owned(),
            default_expanded: false,
            items: vec![PriorityItem::new("TASKS.md", "Tasks", "✅")],
        },
    ]
}
