use tracing::{debug, info};

use crate::models::{Chunk, ChunkConfig};
use crate::patterns;

/// Split a document into processing chunks.
///
/// Primary strategy: when the document carries enough segment markers, split
/// at marker boundaries so each chunk starts with a marker line and keeps
/// the dialogue that follows it. Otherwise fall back to greedy line
/// accumulation under a character budget.
///
/// Chunk boundaries never split a logical line, and chunks concatenated in
/// index order reproduce the document's line sequence.
pub fn split(document: &str, config: &ChunkConfig) -> Vec<Chunk> {
    if document.trim().is_empty() {
        return vec![];
    }

    let marker_lines = document
        .lines()
        .filter(|line| patterns::is_segment_marker(line))
        .count();

    let chunks = if marker_lines > config.marker_threshold {
        info!(
            "Splitting at {} segment-marker boundaries",
            marker_lines
        );
        split_at_markers(document)
    } else {
        info!(
            "Too few segment markers ({}), accumulating lines under a {}-char budget",
            marker_lines, config.target_size
        );
        split_by_budget(document, config.target_size)
    };

    debug!("Produced {} chunks", chunks.len());
    chunks
}

/// Split at segment-marker lines. Any preamble before the first marker
/// (typically the cast list) becomes its own leading chunk.
fn split_at_markers(document: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in document.lines() {
        if patterns::is_segment_marker(line) && !current.is_empty() {
            chunks.push(Chunk::new(chunks.len(), current.join("\n")));
            current.clear();
        }
        current.push(line);
    }

    if !current.is_empty() {
        chunks.push(Chunk::new(chunks.len(), current.join("\n")));
    }

    chunks
}

/// Greedily accumulate lines into chunks not exceeding the character budget.
/// A single line longer than the budget still gets its own chunk rather
/// than being truncated.
fn split_by_budget(document: &str, target_size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for line in document.lines() {
        let added = line.len() + usize::from(!current.is_empty());
        if current_len + added > target_size && !current.is_empty() {
            chunks.push(Chunk::new(chunks.len(), current.join("\n")));
            current.clear();
            current_len = 0;
        }
        current_len += line.len() + usize::from(!current.is_empty());
        current.push(line);
    }

    if !current.is_empty() {
        chunks.push(Chunk::new(chunks.len(), current.join("\n")));
    }

    chunks
}
