//! Diagram languages recognised in fenced code blocks.

use std::fmt;

/// A diagram language that can be rendered through Kroki.
///
/// Mermaid is the primary language; the others are recognised so documents
/// written for a Kroki-backed site render the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramLanguage {
    Mermaid,
    PlantUml,
    C4PlantUml,
    GraphViz,
    Ditaa,
    BlockDiag,
    SeqDiag,
    ActDiag,
    NwDiag,
    Erd,
    Nomnoml,
    Svgbob,
    Vega,
    VegaLite,
    WaveDrom,
    Bpmn,
    D2,
    Pikchr,
    Structurizr,
}

impl DiagramLanguage {
    const ALL: [Self; 19] = [
        Self::Mermaid,
        Self::PlantUml,
        Self::C4PlantUml,
        Self::GraphViz,
        Self::Ditaa,
        Self::BlockDiag,
        Self::SeqDiag,
        Self::ActDiag,
        Self::NwDiag,
        Self::Erd,
        Self::Nomnoml,
        Self::Svgbob,
        Self::Vega,
        Self::VegaLite,
        Self::WaveDrom,
        Self::Bpmn,
        Self::D2,
        Self::Pikchr,
        Self::Structurizr,
    ];

    /// Resolve a fence info word (`mermaid`, `kroki-dot`, `PlantUML`).
    ///
    /// Matching is case-insensitive; returns `None` for ordinary code blocks.
    #[must_use]
    pub fn from_fence(word: &str) -> Option<Self> {
        let word = word.to_ascii_lowercase();
        let name = word.strip_prefix("kroki-").unwrap_or(&word);
        Self::ALL
            .into_iter()
            .find(|lang| lang.endpoint() == name || lang.aliases().contains(&name))
    }

    /// Kroki endpoint, which doubles as the canonical name.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::PlantUml => "plantuml",
            Self::C4PlantUml => "c4plantuml",
            Self::GraphViz => "graphviz",
            Self::Ditaa => "ditaa",
            Self::BlockDiag => "blockdiag",
            Self::SeqDiag => "seqdiag",
            Self::ActDiag => "actdiag",
            Self::NwDiag => "nwdiag",
            Self::Erd => "erd",
            Self::Nomnoml => "nomnoml",
            Self::Svgbob => "svgbob",
            Self::Vega => "vega",
            Self::VegaLite => "vegalite",
            Self::WaveDrom => "wavedrom",
            Self::Bpmn => "bpmn",
            Self::D2 => "d2",
            Self::Pikchr => "pikchr",
            Self::Structurizr => "structurizr",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::PlantUml => &["puml"],
            Self::GraphViz => &["dot"],
            Self::VegaLite => &["vega-lite"],
            _ => &[],
        }
    }
}

impl fmt::Display for DiagramLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}
