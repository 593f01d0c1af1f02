//! Diagram extraction.
//!
//! Fenced blocks naming a diagram language are cut out of the document
//! before markdown conversion and replaced by an empty marker element:
//!
//! ````text
//! ```mermaid                 <div id="diagram-0" data-diagram-slot="3f9a..."></div>
//! graph TD; A-->B      =>
//! ```
//! ````
//!
//! The marker is raw HTML, so it survives conversion as an HTML block and can
//! be located again once the converted page is mounted. Its slot token is
//! derived from the document itself, so markup written by the author cannot
//! pass for a generated marker. Ordinary code blocks are left in place.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

use crate::language::DiagramLanguage;

/// CSS class carried by unresolved placeholder markers.
pub const PLACEHOLDER_CLASS: &str = "diagram-placeholder";

/// Attribute carrying the slot token on generated markers.
pub(crate) const SLOT_ATTRIBUTE: &str = "data-diagram-slot";

/// Prefix of generated placeholder ids.
const ID_PREFIX: &str = "diagram-";

/// A fence line with an info word, an optional body, and a closing fence
/// line. An empty block closes at the line right after its opening fence.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^```[ \t]*([A-Za-z0-9_-]+)[^\n]*\n(?:([\s\S]*?)\r?\n)??```[ \t]*\r?$")
        .expect("fence regex is valid")
});

/// One diagram cut out of a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagramPlaceholder {
    /// `diagram-N`, unique within one extraction.
    pub id: String,
    /// Language named by the fence.
    pub language: DiagramLanguage,
    /// Block body exactly as written.
    pub source: String,
}

impl DiagramPlaceholder {
    /// Source handed to a renderer.
    #[must_use]
    pub fn trimmed_source(&self) -> &str {
        self.source.trim()
    }
}

/// Diagrams of one extraction, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagramMap {
    entries: Vec<DiagramPlaceholder>,
}

impl DiagramMap {
    /// Look up a diagram by placeholder id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DiagramPlaceholder> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiagramPlaceholder> {
        self.entries.iter()
    }

    /// Placeholder ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|d| d.id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DiagramMap {
    type Item = &'a DiagramPlaceholder;
    type IntoIter = std::slice::Iter<'a, DiagramPlaceholder>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Result of [`extract`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    /// Document text with each diagram block replaced by a marker.
    pub text: String,
    /// Extracted diagrams.
    pub diagrams: DiagramMap,
    /// Slot token carried by this extraction's markers. Empty when the
    /// document has no diagrams.
    pub token: String,
}

/// Unresolved placeholder element for `id`, as it appears in mounted HTML.
#[must_use]
pub fn placeholder_marker(id: &str) -> String {
    format!(r#"<div id="{id}" class="{PLACEHOLDER_CLASS}"></div>"#)
}

/// Marker written into the document text before conversion.
pub(crate) fn slot_marker(id: &str, token: &str) -> String {
    format!(r#"<div id="{id}" {SLOT_ATTRIBUTE}="{token}"></div>"#)
}

/// First 64 bits of the document's SHA-256, hex encoded.
fn slot_token(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(&digest[..8])
}

/// Replace every diagram block in `text` with a placeholder marker.
///
/// Ids are assigned from a counter that starts at zero on every call, so the
/// same input always produces the same output.
#[must_use]
pub fn extract(text: &str) -> Extraction {
    let token = slot_token(text);
    let mut entries = Vec::new();

    let rewritten = FENCE.replace_all(text, |caps: &Captures<'_>| {
        let Some(language) = DiagramLanguage::from_fence(&caps[1]) else {
            return caps[0].to_owned();
        };

        let id = format!("{ID_PREFIX}{}", entries.len());
        let marker = slot_marker(&id, &token);
        entries.push(DiagramPlaceholder {
            id,
            language,
            source: caps.get(2).map_or_else(String::new, |body| body.as_str().to_owned()),
        });
        // Trailing newline keeps the marker its own HTML block even when the
        // fence was directly followed by a paragraph.
        format!("{marker}\n")
    });

    if entries.is_empty() {
        return Extraction {
            text: text.to_owned(),
            diagrams: DiagramMap::default(),
            token: String::new(),
        };
    }

    tracing::debug!(count = entries.len(), "Extracted diagram blocks");
    Extraction {
        text: rewritten.into_owned(),
        diagrams: DiagramMap { entries },
        token,
    }
}
