use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::patterns;

/// Hard cap on scanned lines while looking for the cast list. Malformed
/// documents must not turn the scan into a whole-file walk.
const MAX_LINES_TO_CHECK: usize = 500;

/// The cast-list header literal that opens the speaker preamble.
const CAST_LIST_HEADER: &str = "Postavy:";

/// Canonical speaker names extracted from a document's cast-list preamble.
///
/// Built once per document, immutable afterwards. An empty registry is a
/// valid state: speaker detection then runs entirely on the generic fallback
/// patterns.
#[derive(Debug, Clone, Default)]
pub struct SpeakerRegistry {
    /// Unique names, longest first, so that combined alternations match
    /// longer names before their own prefixes ("EVA MALA" before "EVA").
    names: Vec<String>,
}

impl SpeakerRegistry {
    /// Scan the document for a "Postavy:" section and collect the names
    /// listed under it.
    ///
    /// The section ends at the first line that looks like the script body
    /// (leading timecode or dash run) or after a bounded number of scanned
    /// lines. Absence of the section yields an empty registry, never an
    /// error.
    pub fn build(document: &str) -> Self {
        let mut found: BTreeSet<String> = BTreeSet::new();
        let mut in_cast_list = false;
        let mut lines_checked = 0usize;

        for line in document.lines() {
            lines_checked += 1;
            let trimmed = line.trim();

            if !in_cast_list && line.contains(CAST_LIST_HEADER) {
                in_cast_list = true;
                info!("Found cast-list section");
                continue;
            }

            if in_cast_list {
                if patterns::is_script_start(trimmed) {
                    info!(
                        "End of cast-list section detected, {} speakers collected",
                        found.len()
                    );
                    return Self::from_names(found);
                }

                if !trimmed.is_empty() {
                    if starts_uppercase(trimmed) && !patterns::has_dialogue_separator(trimmed) {
                        let cleaned = patterns::clean_speaker_name(trimmed);
                        if !cleaned.is_empty()
                            && cleaned.chars().count() < patterns::MAX_SPEAKER_NAME_LEN
                        {
                            debug!("Added potential speaker: {}", cleaned);
                            found.insert(cleaned);
                        } else {
                            debug!("Skipping cast-list line (too long or empty): {:?}", trimmed);
                        }
                    } else {
                        debug!("Skipping cast-list line (not a name): {:?}", trimmed);
                    }
                }
            }

            if lines_checked > MAX_LINES_TO_CHECK {
                warn!(
                    "Stopped cast-list scan after {} lines",
                    MAX_LINES_TO_CHECK
                );
                return Self::from_names(found);
            }
        }

        if in_cast_list {
            warn!("Cast-list section found but no end marker before EOF");
        } else {
            warn!("No cast-list section found, falling back to generic speaker patterns");
        }
        Self::from_names(found)
    }

    fn from_names(found: BTreeSet<String>) -> Self {
        let mut names: Vec<String> = found.into_iter().collect();
        names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        info!("Final speaker list (longest first): {:?}", names);
        Self { names }
    }

    /// True when no cast list was found.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of known speakers.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Known names, sorted longest first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Exact-name lookup.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_uppercase())
}
