use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Record, RecordKind, SceneType};
use crate::stages::PipelineResult;

/// Machine-readable output: the final record list plus processing metadata.
///
/// Segment numbers arrive already resolved by the pipeline and are emitted
/// as-is; consumers must not re-derive them.
#[derive(Debug, Clone, Serialize)]
pub struct MachineDocument {
    /// Records in final document order.
    pub records: Vec<Record>,
    /// Metadata about the processing run.
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadata {
    /// Unique id for this processing run.
    pub document_id: String,
    /// When the output was generated.
    pub generated_at: DateTime<Utc>,
    /// Optional episode tag passed through from the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    pub total_records: usize,
    pub dialogue_count: usize,
    pub scene_header_count: usize,
    pub segment_marker_count: usize,
    pub text_count: usize,
    pub speaker_count: usize,
    pub chunks_processed: usize,
    pub chunks_degraded: usize,
}

impl MachineDocument {
    /// Assemble from a finished pipeline run.
    pub fn from_result(result: &PipelineResult, episode: Option<String>) -> Self {
        let count = |kind: RecordKind| {
            result
                .records
                .iter()
                .filter(|r| r.kind() == kind)
                .count()
        };

        let metadata = DocumentMetadata {
            document_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            episode,
            total_records: result.records.len(),
            dialogue_count: count(RecordKind::Dialogue),
            scene_header_count: count(RecordKind::SceneHeader),
            segment_marker_count: count(RecordKind::SegmentMarker),
            text_count: count(RecordKind::Text),
            speaker_count: result.registry.len(),
            chunks_processed: result.chunks_processed,
            chunks_degraded: result.chunks_degraded,
        };

        Self {
            records: result.records.clone(),
            metadata,
        }
    }

    /// Write to a JSON file.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable rendering of the record list.
pub struct HumanDocument<'a> {
    records: &'a [Record],
}

impl<'a> HumanDocument<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self { records }
    }

    /// Format the records as readable text: segment banners, speaker lines
    /// with timecodes, scene headings, plain action text.
    pub fn format(&self) -> String {
        let mut output = String::new();

        for record in self.records {
            match record {
                Record::SegmentMarker {
                    timecode,
                    segment_number,
                    ..
                } => {
                    let number = segment_number
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "?".to_string());
                    output.push_str(&format!("===== Segment {} ({})\n\n", number, timecode));
                }
                Record::SceneHeader {
                    scene_type,
                    location,
                    timecode,
                    text,
                } => {
                    if let Some(tc) = timecode {
                        output.push_str(&format!("[{}] ", tc));
                    }
                    let keyword = match scene_type {
                        Some(SceneType::Int) => "INT.",
                        Some(SceneType::Ext) => "EXT.",
                        None => "TITULOK",
                    };
                    output.push_str(keyword);
                    if let Some(location) = location {
                        output.push(' ');
                        output.push_str(location);
                    }
                    if !text.is_empty() {
                        output.push(' ');
                        output.push_str(text);
                    }
                    output.push_str("\n\n");
                }
                Record::Dialogue {
                    speaker,
                    text,
                    timecode,
                    scene_marker,
                } => {
                    if let Some(tc) = timecode {
                        output.push_str(&format!("[{}] ", tc));
                    }
                    output.push_str(speaker);
                    output.push(':');
                    if let Some(marker) = scene_marker {
                        output.push(' ');
                        output.push_str(marker);
                    }
                    if !text.is_empty() {
                        output.push(' ');
                        output.push_str(text);
                    }
                    output.push('\n');
                }
                Record::Text { text, timecode, .. } => {
                    if let Some(tc) = timecode {
                        output.push_str(&format!("[{}] ", tc));
                    }
                    output.push_str(text);
                    output.push('\n');
                }
            }
        }

        output
    }

    /// Write to a text file.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}
