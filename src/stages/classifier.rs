use std::ops::Range;

use regex::Regex;
use tracing::debug;

use crate::models::{Chunk, RawCandidate, SpeakerField};
use crate::patterns;
use crate::registry::SpeakerRegistry;

/// Which detection tier produced a speaker match. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpeakerTier {
    ListMulti,
    ListSingle,
    PatternMulti,
    PatternParen,
    PatternDash,
    PatternColon,
    PatternSimple,
}

/// Per-line structural extraction.
///
/// Given one line of text, finds timecodes, speakers (registry-first, then
/// generic fallback patterns), scene keywords and parenthetical markers, and
/// the residual free text, producing zero or more raw candidates.
/// Deterministic: the same line and registry always yield the same
/// candidates in the same order.
pub struct LineClassifier {
    /// Known names, longest first.
    names: Vec<String>,
    /// Multi-speaker prefix built from the registry alternation, if any.
    registry_multi: Option<Regex>,
}

impl LineClassifier {
    pub fn new(registry: &SpeakerRegistry) -> Self {
        let registry_multi = if registry.is_empty() {
            None
        } else {
            let alt = patterns::speaker_alternation(registry.names());
            Regex::new(&format!(
                r"^((?:{alt}):*(?:\s*,\s*(?:{alt}):*)+)\s+(.*)$"
            ))
            .ok()
        };

        Self {
            names: registry.names().to_vec(),
            registry_multi,
        }
    }

    /// Classify every line of a chunk, in order.
    pub fn classify_chunk(&self, chunk: &Chunk) -> Vec<RawCandidate> {
        chunk
            .lines()
            .flat_map(|line| self.classify_line(line))
            .collect()
    }

    /// Classify a single line into raw candidates.
    ///
    /// A blank line yields nothing. A segment-marker line yields exactly the
    /// marker candidate; co-located text is discarded. Every other line
    /// yields exactly one candidate (dialogue, scene header, or free text);
    /// a line is never silently dropped.
    pub fn classify_line(&self, line: &str) -> Vec<RawCandidate> {
        let original = line.trim();
        if original.is_empty() {
            return vec![];
        }

        // 1. Segment marker wins over everything else on the line.
        if let Some(span) = patterns::find_segment_marker(original) {
            debug!("Segment marker line: {:?}", &original[span.clone()]);
            return vec![RawCandidate {
                kind: Some("segment_marker".to_string()),
                timecode: Some(original[span].to_string()),
                text: Some(String::new()),
                ..Default::default()
            }];
        }

        // 2. Timecodes, removed by span so repeated substrings in the text
        // survive untouched.
        let mut spans: Vec<Range<usize>> = patterns::find_timecodes(original);
        let timecode = if spans.is_empty() {
            None
        } else {
            Some(
                spans
                    .iter()
                    .map(|r| &original[r.clone()])
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        };

        // 3. Speaker detection runs on the line with timecode spans blanked
        // out (byte positions preserved).
        let blanked = blank_spans(original, &spans);
        let offset = blanked
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(blanked.len());
        let search = &blanked[offset..];

        let (speakers, speaker_span, tier) = self.detect_speakers(search, offset);
        if let Some(span) = speaker_span.clone() {
            debug!("Speakers {:?} via {:?}", speakers, tier);
            spans.push(span);
        }

        // 4. Scene keyword: the marker text runs from the keyword to the end
        // of the line, unless the keyword sits inside an already-claimed span.
        let mut scene_markers: Vec<(usize, String)> = Vec::new();
        let mut scene_keyword: Option<Range<usize>> = None;
        if let Some(kw) = patterns::find_scene_keyword(original) {
            if !overlaps_any(&kw, &spans) {
                let marker_text = original[kw.start..].trim().to_string();
                scene_markers.push((kw.start, marker_text));
                scene_keyword = Some(kw.clone());
                spans.push(kw.start..original.len());
            }
        }

        // 5. Parenthetical markers not already covered by another span.
        for paren in patterns::find_parentheticals(original) {
            let covered = spans
                .iter()
                .any(|s| s != &paren && s.start <= paren.start && s.end >= paren.end);
            if !covered {
                scene_markers.push((paren.start, original[paren.clone()].to_string()));
                spans.push(paren);
            }
        }
        scene_markers.sort_by_key(|(pos, _)| *pos);
        let mut marker_texts: Vec<&str> = Vec::new();
        for (_, marker) in &scene_markers {
            if !marker_texts.contains(&marker.as_str()) {
                marker_texts.push(marker);
            }
        }
        let scene_marker = if marker_texts.is_empty() {
            None
        } else {
            Some(marker_texts.join(" "))
        };

        // 6. Residual text: everything not claimed by a recognized span.
        let text = if spans.is_empty() {
            original.to_string()
        } else {
            collapse_whitespace(&blank_spans(original, &spans))
        };

        // 7. One candidate per line; kind by what was found.
        if !speakers.is_empty() {
            let speaker = if speakers.len() == 1 {
                SpeakerField::One(speakers.into_iter().next().unwrap())
            } else {
                SpeakerField::Many(speakers)
            };
            vec![RawCandidate {
                kind: Some("dialogue".to_string()),
                speaker: Some(speaker),
                timecode,
                scene_marker,
                text: Some(text),
                ..Default::default()
            }]
        } else if let Some(kw) = scene_keyword {
            let keyword = original[kw.clone()].trim().to_string();
            vec![RawCandidate {
                kind: Some("scene_header".to_string()),
                scene_type: scene_type_label(&keyword),
                location: derive_location(&original[kw.end..]),
                timecode,
                scene_marker,
                text: Some(text),
                ..Default::default()
            }]
        } else {
            vec![RawCandidate {
                kind: Some("text".to_string()),
                timecode,
                scene_marker,
                text: Some(text),
                ..Default::default()
            }]
        }
    }

    /// Two-tier speaker detection: registry multi, registry single prefix,
    /// fallback multi pattern, then the fallback single patterns in fixed
    /// priority order. Returns the cleaned names, the claimed span in
    /// original-line coordinates, and the winning tier.
    fn detect_speakers(
        &self,
        search: &str,
        offset: usize,
    ) -> (Vec<String>, Option<Range<usize>>, Option<SpeakerTier>) {
        // 2a. Registry multi-speaker prefix
        if let Some(re) = &self.registry_multi {
            if let Some(caps) = re.captures(search) {
                let list = caps.get(1).unwrap();
                let names = split_speaker_list(list.as_str());
                if names.len() > 1 {
                    let span = offset + list.start()..offset + caps.get(2).unwrap().start();
                    return (names, Some(span), Some(SpeakerTier::ListMulti));
                }
            }
        }

        // 2b. Registry single, longest name first, at the line start with a
        // non-alphanumeric boundary after it.
        for name in &self.names {
            if let Some(rest) = search.strip_prefix(name.as_str()) {
                let boundary = rest.chars().next().is_none_or(|c| !c.is_alphanumeric());
                if boundary {
                    let end = extend_over_colons(search, name.len());
                    return (
                        vec![patterns::clean_speaker_name(name)],
                        Some(offset..offset + end),
                        Some(SpeakerTier::ListSingle),
                    );
                }
            }
        }

        // 2c. Fallback multi-speaker pattern
        if let Some(caps) = patterns::MULTI_SPEAKER_FALLBACK.captures(search) {
            let list = caps.get(1).unwrap();
            let names = split_speaker_list(list.as_str());
            if names.len() > 1 {
                let span = offset + list.start()..offset + caps.get(2).unwrap().start();
                return (names, Some(span), Some(SpeakerTier::PatternMulti));
            }
        }

        // 2d. Fallback single-speaker patterns, first match wins.
        let attempts: [(&Regex, usize, SpeakerTier); 4] = [
            (&patterns::SPEAKER_PAREN_FALLBACK, 3, SpeakerTier::PatternParen),
            (&patterns::SPEAKER_DASH_FALLBACK, 2, SpeakerTier::PatternDash),
            (&patterns::SPEAKER_COLON_FALLBACK, 2, SpeakerTier::PatternColon),
            (&patterns::SPEAKER_SIMPLE_FALLBACK, 3, SpeakerTier::PatternSimple),
        ];

        for (re, text_group, tier) in attempts {
            if let Some(caps) = re.captures(search) {
                let name_match = caps.get(1).unwrap();
                let name = patterns::clean_speaker_name(name_match.as_str());
                if !patterns::is_valid_speaker_name(&name) {
                    // Reserved keyword or runaway match; fall through to the
                    // scene/text handling with no speaker claimed.
                    return (vec![], None, None);
                }
                let span = match tier {
                    // The parenthetical stays unclaimed so it can be picked
                    // up as a scene marker.
                    SpeakerTier::PatternParen => {
                        let end = extend_over_colons(search, name_match.end());
                        offset + name_match.start()..offset + end
                    }
                    _ => {
                        offset + name_match.start()
                            ..offset + caps.get(text_group).unwrap().start()
                    }
                };
                return (vec![name], Some(span), Some(tier));
            }
        }

        (vec![], None, None)
    }
}

/// Replace every character inside the given byte spans with spaces, padding
/// multi-byte characters so byte positions stay aligned with the input.
fn blank_spans(s: &str, spans: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(s.len());
    for (pos, ch) in s.char_indices() {
        if spans.iter().any(|r| r.start <= pos && pos < r.end) {
            for _ in 0..ch.len_utf8() {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Collapse whitespace runs to single spaces and trim.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a matched comma-separated speaker prefix into cleaned names.
fn split_speaker_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(patterns::clean_speaker_name)
        .filter(|n| !n.is_empty())
        .collect()
}

/// Extend a span end over any trailing colons.
fn extend_over_colons(s: &str, mut end: usize) -> usize {
    while s[end..].starts_with(':') {
        end += 1;
    }
    end
}

fn overlaps_any(span: &Range<usize>, spans: &[Range<usize>]) -> bool {
    spans.iter().any(|s| span.start < s.end && s.start < span.end)
}

/// "INT." / "EXT." keyword to a scene-type label; TITULOK carries none.
fn scene_type_label(keyword: &str) -> Option<String> {
    let trimmed = keyword.trim_end_matches('.').to_uppercase();
    match trimmed.as_str() {
        "INT" | "EXT" => Some(trimmed),
        _ => None,
    }
}

/// Location from the header remainder after the keyword: strip timecodes and
/// dash runs, then trim separator punctuation.
fn derive_location(after_keyword: &str) -> Option<String> {
    let mut rest = after_keyword.to_string();
    for span in patterns::find_timecodes(&rest).into_iter().rev() {
        rest.replace_range(span, " ");
    }
    let cleaned = collapse_whitespace(&rest);
    let cleaned = cleaned
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | '—' | '.' | ':'))
        .to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
