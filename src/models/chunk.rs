use serde::{Deserialize, Serialize};

/// Configuration for document chunking.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Character budget per chunk in the line-accumulation fallback.
    pub target_size: usize,
    /// Minimum number of segment-marker lines before the marker-boundary
    /// strategy is preferred over the fallback.
    pub marker_threshold: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            target_size: 4_000,
            marker_threshold: 3,
        }
    }
}

/// A bounded contiguous slice of the document, processed as one unit by the
/// classification step and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Ordinal position in the document, starting at 0.
    pub index: usize,
    /// The chunk text; chunk boundaries never split a line.
    pub text: String,
}

impl Chunk {
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// The chunk's lines, in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Number of non-blank lines.
    pub fn non_blank_line_count(&self) -> usize {
        self.lines().filter(|l| !l.trim().is_empty()).count()
    }
}
