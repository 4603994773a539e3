use crate::models::Chunk;
use crate::registry::SpeakerRegistry;

/// System prompt for the classification backend (non-negotiable rules).
pub const SYSTEM_PROMPT: &str = r#"You are an expert screenplay parser. You analyze a segment of a bilingual screenplay transcript and convert it into structured data, one entry per logical line.

For each line, extract these components (all optional):
1. timecode - timestamps like "00:05:44" or "1:15:35", or a SEGMENT MARKER: a timecode followed by at least 5 dashes, like "00:05:44----------"
2. speaker - names in ALL CAPS, which may include:
   - multiple speakers separated by commas (e.g. "PETER, KAROL")
   - speakers with a trailing digit (e.g. "KAROL1")
   - audio notation in parentheses like "(VO)", "(MO)", "(zMO)"
3. text - the actual dialogue or action text

RULES:
- If a line has no clear speaker, put its content in the "text" field; never drop a line.
- Scene headers (INT., EXT., TITULOK) go in "scene_type"/"location" when clear, otherwise in "text".
- Keep ALL speakers uppercase exactly as written.
- Audio notations like "(VO)" belong with the speaker, never duplicated into the text.
- SEGMENT MARKERS must be preserved exactly as written in the "timecode" field, dashes included.
- Preserve the original line order.
- The first page may contain intro content in unusual formats; still parse it.

Submit the result with the submit_segments tool and nothing else."#;

/// Build the user prompt for one chunk, biased by the known speaker list.
pub fn build_chunk_prompt(chunk: &Chunk, registry: &SpeakerRegistry) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Parse chunk {} of a longer screenplay transcript into structured entries.\n\n",
        chunk.index
    ));

    if !registry.is_empty() {
        prompt.push_str("Known speakers in this screenplay (prefer exact matches):\n");
        for name in registry.names() {
            prompt.push_str(&format!("- {name}\n"));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Pay special attention to segment markers: timecodes followed by \
         multiple dashes (like \"00:05:44----------\"). Preserve them exactly \
         as they appear in the timecode field.\n\n",
    );

    prompt.push_str("TEXT:\n```\n");
    prompt.push_str(&chunk.text);
    prompt.push_str("\n```\n");

    prompt
}
