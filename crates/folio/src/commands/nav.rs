//! `folio nav` command implementation.

use std::fmt::Write as _;

use clap::Args;
use folio_site::{SidebarItem, SidebarSection, build_sidebar};

use super::{CommonArgs, open_nav_state, open_site, print_stdout};
use crate::error::CliError;

/// Arguments for the nav command.
#[derive(Args)]
pub(crate) struct NavArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Slug of the current page, marked active (default: the configured
    /// default page).
    #[arg(long, default_value = "")]
    current: String,

    /// Print JSON instead of an outline.
    #[arg(long)]
    json: bool,
}

impl NavArgs {
    /// Execute the nav command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the document root cannot
    /// be listed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.common.load_config()?;
        let site = open_site(&config);
        let state = open_nav_state(&config);

        let sections = site.sections()?;
        let current = current_slug(&self.current, &config.docs_resolved.default_page);
        let sidebar = build_sidebar(&sections, &config.navigation, current, |key| {
            state.is_expanded(key)
        });

        if self.json {
            print_stdout(&serde_json::to_string_pretty(&sidebar)?)
        } else {
            print_stdout(outline(&sidebar).trim_end())
        }
    }
}

/// The requested slug, or `default_page` when it is empty.
fn current_slug<'a>(current: &'a str, default_page: &'a str) -> &'a str {
    if current.trim_matches('/').is_empty() {
        default_page
    } else {
        current
    }
}

/// Indented text rendering of the sidebar. Collapsed sections and folders
/// hide their contents.
fn outline(sidebar: &[SidebarSection]) -> String {
    let mut out = String::new();
    for section in sidebar {
        let marker = if section.expanded { '▾' } else { '▸' };
        let _ = writeln!(out, "{marker} {} {}", section.icon, section.title);
        if section.expanded {
            for item in &section.items {
                outline_item(&mut out, item, 1);
            }
        }
    }
    out
}

fn outline_item(out: &mut String, item: &SidebarItem, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = match (item.is_container, item.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "",
    };
    let icon = item
        .icon
        .as_deref()
        .map(|icon| format!("{icon} "))
        .unwrap_or_default();
    let active = if item.active { "  <- current" } else { "" };
    let _ = writeln!(out, "{indent}{marker}{icon}{} ({}){active}", item.label, item.href);

    if item.expanded {
        for child in &item.children {
            outline_item(out, child, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn link(label: &str, href: &str) -> SidebarItem {
        SidebarItem {
            label: label.to_owned(),
            icon: None,
            href: href.to_owned(),
            key: href.trim_start_matches('/').to_owned(),
            active: false,
            is_container: false,
            expanded: false,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_empty_current_is_default_page() {
        assert_eq!(current_slug("", "OVERVIEW"), "OVERVIEW");
        assert_eq!(current_slug("/", "OVERVIEW"), "OVERVIEW");
        assert_eq!(current_slug("nodes/http", "OVERVIEW"), "nodes/http");
    }

    #[test]
    fn test_outline() {
        let sidebar = vec![
            SidebarSection {
                title: "Getting Started".to_owned(),
                icon: "🚀".to_owned(),
                expanded: true,
                items: vec![
                    SidebarItem {
                        icon: Some("📋".to_owned()),
                        active: true,
                        ..link("Overview", "/OVERVIEW")
                    },
                    SidebarItem {
                        is_container: true,
                        expanded: true,
                        children: vec![link("Overview", "/nodes/README")],
                        ..link("Nodes", "/nodes")
                    },
                    SidebarItem {
                        is_container: true,
                        children: vec![link("hidden", "/drafts/hidden")],
                        ..link("drafts", "/drafts")
                    },
                ],
            },
            SidebarSection {
                title: "Other".to_owned(),
                icon: "📄".to_owned(),
                expanded: false,
                items: vec![link("misc", "/misc")],
            },
        ];

        assert_eq!(
            outline(&sidebar),
            concat!(
                "▾ 🚀 Getting Started\n",
                "  📋 Overview (/OVERVIEW)  <- current\n",
                "  ▾ Nodes (/nodes)\n",
                "    Overview (/nodes/README)\n",
                "  ▸ drafts (/drafts)\n",
                "▸ 📄 Other\n",
            )
        );
    }
}
