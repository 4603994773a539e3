use serde::{Deserialize, Serialize};

/// The four canonical record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Dialogue,
    SceneHeader,
    SegmentMarker,
    Text,
}

impl RecordKind {
    /// The serialized tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Dialogue => "dialogue",
            RecordKind::SceneHeader => "scene_header",
            RecordKind::SegmentMarker => "segment_marker",
            RecordKind::Text => "text",
        }
    }

    /// Parse a kind label; anything else is an ad hoc label the normalizer
    /// has to fold away.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "dialogue" => Some(RecordKind::Dialogue),
            "scene_header" => Some(RecordKind::SceneHeader),
            "segment_marker" => Some(RecordKind::SegmentMarker),
            "text" => Some(RecordKind::Text),
            _ => None,
        }
    }
}

/// Interior or exterior scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SceneType {
    Int,
    Ext,
}

impl SceneType {
    /// Parse from a scene keyword or label ("INT.", "EXT", "int").
    pub fn parse(label: &str) -> Option<Self> {
        let upper = label.trim().trim_end_matches('.').to_uppercase();
        match upper.as_str() {
            "INT" => Some(SceneType::Int),
            "EXT" => Some(SceneType::Ext),
            _ => None,
        }
    }
}

/// The canonical, typed output unit of the pipeline.
///
/// One variant per kind; untyped candidate maps never flow past the
/// normalizer that produces these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// A line of dialogue attributed to one speaker. Multi-speaker input
    /// lines expand into sibling records, one per speaker.
    Dialogue {
        /// Canonical speaker name, with audio notation appended in
        /// parentheses when present (e.g. "FERNANDO (MO)").
        speaker: String,
        /// The spoken text with all structural spans removed.
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        timecode: Option<String>,
        /// Parenthetical asides not embedded in the speaker field.
        #[serde(skip_serializing_if = "Option::is_none")]
        scene_marker: Option<String>,
    },
    /// A scene heading (INT./EXT./TITULOK line).
    SceneHeader {
        #[serde(skip_serializing_if = "Option::is_none")]
        scene_type: Option<SceneType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timecode: Option<String>,
        text: String,
    },
    /// A structural break: timecode plus a long dash run. Numbered
    /// sequentially across the whole document by the pipeline.
    SegmentMarker {
        /// The full marker string including the dash run.
        timecode: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        segment_number: Option<u32>,
        text: String,
    },
    /// Free text: a line with no recognizable structure.
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        timecode: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        scene_marker: Option<String>,
    },
}

impl Record {
    /// This record's kind tag.
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Dialogue { .. } => RecordKind::Dialogue,
            Record::SceneHeader { .. } => RecordKind::SceneHeader,
            Record::SegmentMarker { .. } => RecordKind::SegmentMarker,
            Record::Text { .. } => RecordKind::Text,
        }
    }

    /// The content text; always present, possibly empty.
    pub fn text(&self) -> &str {
        match self {
            Record::Dialogue { text, .. }
            | Record::SceneHeader { text, .. }
            | Record::SegmentMarker { text, .. }
            | Record::Text { text, .. } => text,
        }
    }

    /// The raw timecode, if any. For segment markers this is the full
    /// marker string including the dash run.
    pub fn timecode(&self) -> Option<&str> {
        match self {
            Record::Dialogue { timecode, .. }
            | Record::SceneHeader { timecode, .. }
            | Record::Text { timecode, .. } => timecode.as_deref(),
            Record::SegmentMarker { timecode, .. } => Some(timecode),
        }
    }

    /// The speaker name; present only for dialogue.
    pub fn speaker(&self) -> Option<&str> {
        match self {
            Record::Dialogue { speaker, .. } => Some(speaker),
            _ => None,
        }
    }

    /// The sequential marker number; present only for segment markers.
    pub fn segment_number(&self) -> Option<u32> {
        match self {
            Record::SegmentMarker { segment_number, .. } => *segment_number,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serde_tag() {
        let record = Record::Dialogue {
            speaker: "FERNANDO (MO)".to_string(),
            text: "Vstúpte.".to_string(),
            timecode: Some("00:05:44".to_string()),
            scene_marker: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "dialogue");
        assert_eq!(json["speaker"], "FERNANDO (MO)");
        assert!(json.get("scene_marker").is_none());

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_scene_type_parse() {
        assert_eq!(SceneType::parse("INT."), Some(SceneType::Int));
        assert_eq!(SceneType::parse("ext"), Some(SceneType::Ext));
        assert_eq!(SceneType::parse("TITULOK"), None);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            RecordKind::Dialogue,
            RecordKind::SceneHeader,
            RecordKind::SegmentMarker,
            RecordKind::Text,
        ] {
            assert_eq!(RecordKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(RecordKind::parse("action_line"), None);
    }
}
