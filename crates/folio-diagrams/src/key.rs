//! Diagram cache key computation.

use sha2::{Digest, Sha256};

/// Everything that affects a rendered diagram.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Kroki endpoint (e.g., "mermaid").
    pub endpoint: &'a str,
    /// Output format ("svg").
    pub format: &'a str,
    /// Trimmed diagram source.
    pub source: &'a str,
}

impl DiagramKey<'_> {
    /// Hex SHA-256 of `"{endpoint}:{format}:{source}"`.
    #[must_use]
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        for (i, part) in [self.endpoint, self.format, self.source].iter().enumerate() {
            if i > 0 {
                hasher.update(b":");
            }
            hasher.update(part.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key<'a>(endpoint: &'a str, source: &'a str) -> DiagramKey<'a> {
        DiagramKey {
            endpoint,
            format: "svg",
            source,
        }
    }

    #[test]
    fn test_hash_matches_joined_digest() {
        let expected = hex::encode(Sha256::digest(b"mermaid:svg:graph TD"));
        assert_eq!(key("mermaid", "graph TD").hash(), expected);
    }

    #[test]
    fn test_hash_depends_on_every_part() {
        let base = key("mermaid", "graph TD").hash();

        assert_eq!(base, key("mermaid", "graph TD").hash());
        assert_ne!(base, key("plantuml", "graph TD").hash());
        assert_ne!(base, key("mermaid", "graph LR").hash());
        assert_ne!(
            base,
            DiagramKey {
                format: "png",
                ..key("mermaid", "graph TD")
            }
            .hash()
        );
        assert_eq!(base.len(), 64);
    }
}
