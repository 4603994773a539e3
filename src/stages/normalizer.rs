use tracing::debug;

use crate::models::{RawCandidate, Record, RecordKind, SceneType};
use crate::patterns;

/// Map a raw candidate onto the canonical record shape.
///
/// This is the single translation boundary between untyped external data
/// (local classifier output, LLM responses, re-fed normalized records) and
/// typed records. Returns no records for a candidate carrying no
/// information, one record for the common case, and one sibling record per
/// speaker for list-valued speaker fields.
///
/// Idempotent: normalizing already-normalized output yields the same result.
pub fn normalize(candidate: &RawCandidate) -> Vec<Record> {
    // 1. A segment-marker timecode wins over everything else; a marker never
    // carries speaker or scene data.
    if let Some(tc) = candidate.timecode.as_deref() {
        if patterns::is_segment_marker(tc) {
            return vec![Record::SegmentMarker {
                timecode: tc.to_string(),
                segment_number: candidate.segment_number,
                text: candidate.text.clone().unwrap_or_default(),
            }];
        }
    }

    // 2. Legacy key renames: the first non-blank of speaker, character,
    // characters wins.
    let speaker_field = [
        candidate.speaker.as_ref(),
        candidate.character.as_ref(),
        candidate.characters.as_ref(),
    ]
    .into_iter()
    .flatten()
    .find(|f| !f.is_blank());

    let mut speakers: Vec<String> = speaker_field
        .map(|f| f.values().iter().map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    // 3. Merge a separate audio notation into the speaker, unless one is
    // already embedded.
    if let Some(audio) = candidate
        .audio_type
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
    {
        for speaker in &mut speakers {
            if !speaker.contains('(') {
                *speaker = format!("{speaker} ({audio})");
            }
        }
    }

    let mut text = candidate.text.clone().unwrap_or_default();
    let mut timecode = candidate.timecode.clone();
    let mut scene_type = candidate.scene_type.clone();

    // 4. An ad hoc kind label (LLM inventions like "action_line") is folded
    // into the text together with any scene fields it arrived with.
    let label = candidate.kind.as_deref().map(str::trim).filter(|k| !k.is_empty());
    let canonical = label.and_then(RecordKind::parse);
    if let (Some(label), None) = (label, canonical) {
        debug!("Folding ad hoc kind label {:?}", label);
        if text.trim().is_empty() && scene_type.is_none() && timecode.is_none() {
            text = format!("Type: {label}");
        } else if scene_type.is_some() || timecode.is_some() {
            let mut parts: Vec<String> = vec![label.to_uppercase()];
            parts.extend(scene_type.take());
            parts.extend(timecode.take());
            if !text.trim().is_empty() {
                parts.push(text);
            }
            text = parts.join(" ");
        }
    }

    // 6. A candidate with nothing at all is deliberate data-quality filtering,
    // not an error.
    let informationless = speakers.is_empty()
        && text.trim().is_empty()
        && timecode.is_none()
        && scene_type.is_none()
        && candidate.location.is_none()
        && candidate.scene_marker.is_none();
    if informationless {
        debug!("Dropping empty candidate");
        return vec![];
    }

    // 7. One sibling dialogue record per speaker, same text for each; a
    // dialogue candidate without a usable speaker degrades to free text.
    if !speakers.is_empty() {
        return speakers
            .into_iter()
            .map(|speaker| Record::Dialogue {
                speaker,
                text: text.clone(),
                timecode: timecode.clone(),
                scene_marker: candidate.scene_marker.clone(),
            })
            .collect();
    }

    let is_scene_header =
        canonical == Some(RecordKind::SceneHeader) || scene_type.is_some();
    if is_scene_header {
        return vec![Record::SceneHeader {
            scene_type: scene_type.as_deref().and_then(SceneType::parse),
            location: candidate.location.clone(),
            timecode,
            text,
        }];
    }

    vec![Record::Text {
        text,
        timecode,
        scene_marker: candidate.scene_marker.clone(),
    }]
}
