//! Rendering pipeline.
//!
//! Orchestrates the two phases of rendering one document:
//!
//! 1. extract diagrams, convert and sanitize, mount the result;
//! 2. resolve diagrams into the mounted view.
//!
//! Every call to [`RenderPipeline::render`] with new input takes a fresh
//! generation number. A render that finds a newer generation when it is
//! about to mount gives up without touching the view; diagram results that
//! arrive after a newer mount are dropped by the driver. The last input
//! always wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::convert::MarkdownConverter;
use crate::driver::{DriveReport, resolve_diagrams};
use crate::extract::{DiagramMap, extract};
use crate::renderer::DiagramRenderer;
use crate::view::{MountedView, SharedView, lock_view};

/// Pipeline state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// Nothing rendered yet.
    Idle,
    /// Cutting diagram blocks out of the input.
    Extracting,
    /// Markdown conversion and sanitization in progress.
    Converting,
    /// Phase-one output mounted; `pending` diagrams await resolution.
    Mounted {
        /// Number of diagrams in this pass.
        pending: usize,
    },
    /// Every diagram of the current pass has markup or an error block.
    DiagramsResolved,
}

/// Output of phase one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseOne {
    /// Sanitized HTML (or the escaped fallback) with every diagram still
    /// showing its placeholder.
    pub html: String,
    /// Diagrams extracted from the input.
    pub diagrams: DiagramMap,
}

/// Result of [`RenderPipeline::render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Input identical to the previous render; nothing was done.
    Unchanged,
    /// A newer render took over before this one finished.
    Superseded {
        /// Generation of the abandoned render.
        generation: u64,
    },
    /// Both phases finished for this input.
    Completed {
        /// Generation of this render.
        generation: u64,
        /// Final HTML with diagrams resolved.
        html: String,
        /// Diagram outcome counts.
        report: DriveReport,
    },
}

/// Two-phase document renderer.
pub struct RenderPipeline<R> {
    renderer: R,
    converter: MarkdownConverter,
    generation: AtomicU64,
    last_input: Mutex<Option<String>>,
    state: Mutex<PipelineState>,
    view: SharedView,
}

impl<R: DiagramRenderer> RenderPipeline<R> {
    /// Pipeline with the default (ammonia) converter.
    pub fn new(renderer: R) -> Self {
        Self::with_converter(renderer, MarkdownConverter::default())
    }

    pub fn with_converter(renderer: R, converter: MarkdownConverter) -> Self {
        Self {
            renderer,
            converter,
            generation: AtomicU64::new(0),
            last_input: Mutex::new(None),
            state: Mutex::new(PipelineState::Idle),
            view: SharedView::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The mounted view.
    pub fn view(&self) -> SharedView {
        Arc::clone(&self.view)
    }

    /// Serialize the mounted view as it is right now.
    pub fn html(&self) -> String {
        lock_view(&self.view).to_html()
    }

    /// Extract and convert without touching pipeline state.
    pub async fn phase_one(&self, document: &str) -> PhaseOne {
        let extraction = extract(document);
        let html = self.converter.convert(&extraction.text).await;
        PhaseOne {
            html: MountedView::mount(0, &html, &extraction.token).to_html(),
            diagrams: extraction.diagrams,
        }
    }

    /// Render `document` through both phases.
    ///
    /// Does nothing if `document` equals the previous input.
    pub async fn render(&self, document: &str) -> RenderOutcome {
        {
            let mut last = self
                .last_input
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if last.as_deref() == Some(document) {
                return RenderOutcome::Unchanged;
            }
            *last = Some(document.to_owned());
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.set_state(generation, PipelineState::Extracting);
        let extraction = extract(document);

        self.set_state(generation, PipelineState::Converting);
        let html = self.converter.convert(&extraction.text).await;

        {
            let mut view = lock_view(&self.view);
            if !self.is_current(generation) {
                tracing::debug!(generation, "Render superseded before mount");
                return RenderOutcome::Superseded { generation };
            }
            *view = MountedView::mount(generation, &html, &extraction.token);
        }
        self.set_state(
            generation,
            PipelineState::Mounted {
                pending: extraction.diagrams.len(),
            },
        );

        let diagrams = extraction.diagrams;
        if diagrams.is_empty() {
            return RenderOutcome::Completed {
                generation,
                html,
                report: DriveReport::default(),
            };
        }

        let report = resolve_diagrams(&self.renderer, &self.view, generation, &diagrams).await;

        let view = lock_view(&self.view);
        if view.generation() != generation {
            tracing::debug!(generation, ?report, "Render superseded during diagram resolution");
            return RenderOutcome::Superseded { generation };
        }
        let html = view.to_html();
        drop(view);

        self.set_state(generation, PipelineState::DiagramsResolved);
        RenderOutcome::Completed {
            generation,
            html,
            report,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Record a state transition if `generation` is still the newest render.
    fn set_state(&self, generation: u64, next: PipelineState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_current(generation) {
            tracing::debug!(generation, from = ?*state, to = ?next, "Pipeline transition");
            *state = next;
        }
    }
}
