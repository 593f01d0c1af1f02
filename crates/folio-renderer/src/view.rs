//! The mounted view.
//!
//! After phase one the sanitized HTML is "mounted": split into static HTML
//! and one slot per generated marker found in it. Only markers carrying the
//! extraction's slot token become slots, each id at most once. Diagram
//! resolution then fills individual slots in place. Each mount carries the generation of the
//! render that produced it so late results from an older render can tell
//! they no longer apply.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use regex::Regex;

use crate::extract::{SLOT_ATTRIBUTE, placeholder_marker};

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"<div id="([^"<>]+)" {SLOT_ATTRIBUTE}="([^"<>]*)"></div>"#
    ))
    .expect("marker regex is valid")
});

/// View shared between the pipeline and in-flight diagram renders.
pub type SharedView = Arc<Mutex<MountedView>>;

/// Lock a shared view, recovering the data from a poisoned lock.
pub fn lock_view(view: &SharedView) -> MutexGuard<'_, MountedView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State of one placeholder slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Still showing the empty marker.
    Pending,
    /// Replaced by rendered markup or an error block.
    Filled(String),
}

#[derive(Clone, Debug)]
enum Segment {
    Html(String),
    Slot { id: String, state: SlotState },
}

/// Mounted HTML with addressable placeholder slots.
#[derive(Clone, Debug, Default)]
pub struct MountedView {
    generation: u64,
    segments: Vec<Segment>,
}

impl MountedView {
    /// Mount `html` for render `generation`, turning markers that carry
    /// `token` into slots. Any other marker-like markup stays static.
    #[must_use]
    pub fn mount(generation: u64, html: &str, token: &str) -> Self {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        let mut last = 0;
        for caps in MARKER.captures_iter(html) {
            let (Some(whole), Some(id), Some(slot)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if token.is_empty() || slot.as_str() != token || !seen.insert(id.as_str()) {
                tracing::debug!(id = id.as_str(), "Ignoring marker without a matching slot token");
                continue;
            }
            if whole.start() > last {
                segments.push(Segment::Html(html[last..whole.start()].to_owned()));
            }
            segments.push(Segment::Slot {
                id: id.as_str().to_owned(),
                state: SlotState::Pending,
            });
            last = whole.end();
        }
        if last < html.len() {
            segments.push(Segment::Html(html[last..].to_owned()));
        }
        Self {
            generation,
            segments,
        }
    }

    /// Generation of the render this view was mounted for. Zero means
    /// nothing has been mounted yet.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// State of the first slot with `id`.
    #[must_use]
    pub fn slot(&self, id: &str) -> Option<&SlotState> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Slot { id: slot_id, state } if slot_id == id => Some(state),
            _ => None,
        })
    }

    /// True if a slot with `id` exists and is still pending.
    #[must_use]
    pub fn has_pending(&self, id: &str) -> bool {
        matches!(self.slot(id), Some(SlotState::Pending))
    }

    /// Ids of all pending slots, in document order.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Slot {
                    id,
                    state: SlotState::Pending,
                } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Fill the pending slot `id` with `content`.
    ///
    /// Returns false (and changes nothing) if no such pending slot exists.
    pub fn fill(&mut self, id: &str, content: String) -> bool {
        for segment in &mut self.segments {
            if let Segment::Slot { id: slot_id, state } = segment
                && slot_id.as_str() == id
                && *state == SlotState::Pending
            {
                *state = SlotState::Filled(content);
                return true;
            }
        }
        false
    }

    /// Serialize the current view.
    ///
    /// Pending slots keep their marker; filled slots lose the placeholder
    /// class and wrap their content.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Html(html) => out.push_str(html),
                Segment::Slot {
                    id,
                    state: SlotState::Pending,
                } => out.push_str(&placeholder_marker(id)),
                Segment::Slot {
                    id,
                    state: SlotState::Filled(content),
                } => {
                    out.push_str(&format!(r#"<div id="{id}">{content}</div>"#));
                }
            }
        }
        out
    }
}
