use serde::{Deserialize, Serialize};

use super::{Record, SceneType};

/// A speaker value as it arrives from a classification backend: usually a
/// string, occasionally an array of names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeakerField {
    One(String),
    Many(Vec<String>),
}

impl SpeakerField {
    /// All non-blank values, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            SpeakerField::One(s) => {
                if s.trim().is_empty() {
                    vec![]
                } else {
                    vec![s.as_str()]
                }
            }
            SpeakerField::Many(list) => list
                .iter()
                .map(|s| s.as_str())
                .filter(|s| !s.trim().is_empty())
                .collect(),
        }
    }

    /// True when no usable value is present.
    pub fn is_blank(&self) -> bool {
        self.values().is_empty()
    }
}

impl From<&str> for SpeakerField {
    fn from(s: &str) -> Self {
        SpeakerField::One(s.to_string())
    }
}

/// A raw candidate record, in whatever shape the classification step
/// produced it.
///
/// Classification backends (local or LLM) are allowed any of the legacy
/// field-name variants; the normalizer is the single place that maps this
/// onto the canonical [`Record`] shape. Unknown extra keys are ignored on
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Kind label; may be an ad hoc string invented by an LLM.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timecode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<SpeakerField>,
    /// Legacy alias for `speaker`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<SpeakerField>,
    /// Legacy alias for `speaker`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<SpeakerField>,
    /// Audio notation supplied separately from the speaker (e.g. "VO").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_number: Option<u32>,
}

impl RawCandidate {
    /// A bare free-text candidate carrying the full line verbatim.
    pub fn from_text(line: &str) -> Self {
        Self {
            kind: Some("text".to_string()),
            text: Some(line.to_string()),
            ..Default::default()
        }
    }
}

impl From<&Record> for RawCandidate {
    /// Re-project a normalized record into candidate shape, so normalized
    /// output can safely re-enter the normalizer.
    fn from(record: &Record) -> Self {
        match record {
            Record::Dialogue {
                speaker,
                text,
                timecode,
                scene_marker,
            } => Self {
                kind: Some("dialogue".to_string()),
                speaker: Some(SpeakerField::One(speaker.clone())),
                text: Some(text.clone()),
                timecode: timecode.clone(),
                scene_marker: scene_marker.clone(),
                ..Default::default()
            },
            Record::SceneHeader {
                scene_type,
                location,
                timecode,
                text,
            } => Self {
                kind: Some("scene_header".to_string()),
                scene_type: scene_type.map(|t| match t {
                    SceneType::Int => "INT".to_string(),
                    SceneType::Ext => "EXT".to_string(),
                }),
                location: location.clone(),
                timecode: timecode.clone(),
                text: Some(text.clone()),
                ..Default::default()
            },
            Record::SegmentMarker {
                timecode,
                segment_number,
                text,
            } => Self {
                kind: Some("segment_marker".to_string()),
                timecode: Some(timecode.clone()),
                segment_number: *segment_number,
                text: Some(text.clone()),
                ..Default::default()
            },
            Record::Text {
                text,
                timecode,
                scene_marker,
            } => Self {
                kind: Some("text".to_string()),
                text: Some(text.clone()),
                timecode: timecode.clone(),
                scene_marker: scene_marker.clone(),
                ..Default::default()
            },
        }
    }
}
