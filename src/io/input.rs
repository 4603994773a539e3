use std::path::Path;

use anyhow::{Context, Result};

/// Read a transcript document into a single decoded string.
///
/// Container-format extraction (DOCX etc.) happens upstream; this reads
/// plain UTF-8 text, drops a leading BOM, and normalizes line endings so the
/// rest of the pipeline only ever sees `\n`.
pub fn read_document(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(normalize_text(&content))
}

/// BOM strip plus CRLF/CR newline normalization.
pub fn normalize_text(content: &str) -> String {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content.replace("\r\n", "\n").replace('\r', "\n")
}
