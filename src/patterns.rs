use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum run of dash-like characters for a segment marker.
///
/// The source transcripts are inconsistent between 5 and 9; 5 is the
/// backward-compatible minimum and is applied uniformly everywhere.
pub const DASH_RUN_MIN: usize = 5;

/// Segment marker: a timecode immediately followed by a long dash run,
/// optionally wrapped in markdown bold stars or prefixed by a reel letter
/// (e.g. "00:05:44----------", "**06:12----------**", "A 00:05:44------").
static SEGMENT_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\*{{0,2}}[A-Z]?\s?\d{{1,2}}:\d{{2}}(?::\d{{2}})?\s*[-–—]{{{min},}}\*{{0,2}}",
        min = DASH_RUN_MIN
    ))
    .unwrap()
});

/// Timecode, optionally a range and optionally prefixed with a reel letter
/// (e.g. "00:05:44", "00:05-00:07", "A 00:05:44").
static TIMECODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:A\s*)?\b\d{2}:\d{2}(?::\d{2})?(?:-\s*\d{2}:\d{2}(?::\d{2})?)?\b").unwrap()
});

/// Scene keyword anywhere in a line; the marker text runs from the keyword
/// to the end of the line.
static SCENE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(INT\.|EXT\.|TITULOK)\s*").unwrap());

/// Scene header line start, checked against the trimmed uppercased line.
static SCENE_HEADER_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:INT|EXT)(?:[.\s/-]|$)").unwrap());

/// Parenthetical span (audio notation or aside).
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());

/// Start of the script proper: a leading timecode or a bare dash run.
/// Terminates the cast-list scan.
static SCRIPT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:A\s*)?\d{{2}}:\d{{2}}|^[-–—]{{{min},}}",
        min = DASH_RUN_MIN
    ))
    .unwrap()
});

/// Tab or >=2 consecutive spaces: a line containing one is likely dialogue,
/// not a cast-list name.
static DIALOGUE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t|\s{2,}").unwrap());

/// A speaker name token: uppercase letters (incl. Central-European
/// diacritics) and spaces, optionally a single disambiguating digit.
pub const SPEAKER_BASE: &str = r"[A-ZÁČĎÉÍĹĽŇÓŔŠŤÚÝŽ\s]+\d?";

/// Fallback multi-speaker prefix: comma list of >=2 name tokens, then
/// whitespace, then text.
pub static MULTI_SPEAKER_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^({base}:*(?:,\s*{base}:*)+)\s+(.*)$",
        base = SPEAKER_BASE
    ))
    .unwrap()
});

/// Fallback single speaker with a parenthetical marker, then tab, then text.
pub static SPEAKER_PAREN_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({base}):*\s*(\(.*\))\s*\t(.*)$", base = SPEAKER_BASE)).unwrap()
});

/// Fallback single speaker followed by a dash and text.
pub static SPEAKER_DASH_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({base}):*\s*[-–—]\s*(.*)$", base = SPEAKER_BASE)).unwrap()
});

/// Fallback single speaker followed by a colon and text.
pub static SPEAKER_COLON_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({base}):*:\s+(.*)$", base = SPEAKER_BASE)).unwrap()
});

/// Fallback single speaker followed by whitespace and text.
pub static SPEAKER_SIMPLE_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({base}):*(\s+)(.*)$", base = SPEAKER_BASE)).unwrap()
});

/// Speaker names this long or longer are rejected as misparses.
pub const MAX_SPEAKER_NAME_LEN: usize = 50;

/// Keywords that must never be taken for a speaker name.
pub const RESERVED_KEYWORDS: [&str; 3] = ["INT.", "EXT.", "TITULOK"];

/// True if the line contains a segment marker sequence anywhere.
pub fn is_segment_marker(s: &str) -> bool {
    SEGMENT_MARKER.is_match(s)
}

/// The first segment marker span in the line, if any.
pub fn find_segment_marker(s: &str) -> Option<Range<usize>> {
    SEGMENT_MARKER.find(s).map(|m| m.range())
}

/// All timecode spans in the line, in order. Trailing dash runs are not part
/// of a timecode; marker-bearing lines are handled by `find_segment_marker`.
pub fn find_timecodes(s: &str) -> Vec<Range<usize>> {
    TIMECODE.find_iter(s).map(|m| m.range()).collect()
}

/// True if the trimmed, uppercased line starts with INT or EXT.
pub fn is_scene_header(s: &str) -> bool {
    SCENE_HEADER_START.is_match(&s.trim().to_uppercase())
}

/// The first scene keyword span in the line, if any.
pub fn find_scene_keyword(s: &str) -> Option<Range<usize>> {
    SCENE_KEYWORD.find(s).map(|m| m.range())
}

/// All parenthetical spans in the line, in order.
pub fn find_parentheticals(s: &str) -> Vec<Range<usize>> {
    PARENTHETICAL.find_iter(s).map(|m| m.range()).collect()
}

/// True if the line looks like the start of the script body.
pub fn is_script_start(s: &str) -> bool {
    SCRIPT_START.is_match(s)
}

/// True if the line contains a likely dialogue separator.
pub fn has_dialogue_separator(s: &str) -> bool {
    DIALOGUE_SEPARATOR.is_match(s)
}

/// Strip trailing colons and surrounding whitespace from a speaker name.
pub fn clean_speaker_name(name: &str) -> String {
    name.trim().trim_end_matches(':').trim().to_string()
}

/// True if the captured name is usable as a speaker: short enough and not a
/// reserved scene keyword.
pub fn is_valid_speaker_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() < MAX_SPEAKER_NAME_LEN
        && !RESERVED_KEYWORDS.contains(&name)
}

/// Build a regex alternation of known speaker names, longest first so that
/// longer names win over their own prefixes (e.g. "EVA MALA" before "EVA").
pub fn speaker_alternation(names_by_length_desc: &[String]) -> String {
    names_by_length_desc
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_marker_detection() {
        assert!(is_segment_marker("00:05:44----------"));
        assert!(is_segment_marker("00:01:33-----"));
        assert!(is_segment_marker("**06:12----------**"));
        assert!(is_segment_marker("A 00:05:44——————"));
        assert!(is_segment_marker("some text 00:05:44---------- more"));

        // Four dashes is below the threshold
        assert!(!is_segment_marker("00:05:44----"));
        // A bare dash run without a timecode is not a marker
        assert!(!is_segment_marker("----------"));
        // A plain timecode is not a marker
        assert!(!is_segment_marker("00:05:44"));
        assert!(!is_segment_marker(""));
    }

    #[test]
    fn test_find_segment_marker_span() {
        let line = "00:01:33----------";
        let span = find_segment_marker(line).unwrap();
        assert_eq!(&line[span], "00:01:33----------");
    }

    #[test]
    fn test_find_timecodes() {
        let line = "00:01:33\tANDREJ\t(dychy) Kde si bola?";
        let spans = find_timecodes(line);
        assert_eq!(spans.len(), 1);
        assert_eq!(&line[spans[0].clone()], "00:01:33");

        let range = "00:05-00:07 dialogue";
        let spans = find_timecodes(range);
        assert_eq!(&range[spans[0].clone()], "00:05-00:07");

        assert!(find_timecodes("no timecode here").is_empty());
    }

    #[test]
    fn test_scene_header() {
        assert!(is_scene_header("INT. KUCHYŇA - DEŇ"));
        assert!(is_scene_header("  ext. ulica - noc"));
        assert!(is_scene_header("INT/EXT AUTO"));
        assert!(is_scene_header("INT"));
        assert!(!is_scene_header("INTERIÉR BYTU"));
        assert!(!is_scene_header("ANDREJ\tKde si?"));
    }

    #[test]
    fn test_find_scene_keyword() {
        let line = "00:07:31 INT. PALÁC";
        let span = find_scene_keyword(line).unwrap();
        assert_eq!(span.start, 9);
        assert!(find_scene_keyword("TITULOK: Madrid 1504").is_some());
        assert!(find_scene_keyword("no keyword").is_none());
    }

    #[test]
    fn test_find_parentheticals() {
        let line = "ANDREJ (VO) hovorí (ticho)";
        let spans = find_parentheticals(line);
        assert_eq!(spans.len(), 2);
        assert_eq!(&line[spans[0].clone()], "(VO)");
        assert_eq!(&line[spans[1].clone()], "(ticho)");
    }

    #[test]
    fn test_script_start() {
        assert!(is_script_start("00:01:33----------"));
        assert!(is_script_start("00:01:33\tANDREJ\tKde?"));
        assert!(is_script_start("----------"));
        assert!(is_script_start("A 00:05:44"));
        assert!(!is_script_start("ANDREJ"));
        assert!(!is_script_start(""));
    }

    #[test]
    fn test_clean_speaker_name() {
        assert_eq!(clean_speaker_name("ANDREJ:"), "ANDREJ");
        assert_eq!(clean_speaker_name("ANDREJ::"), "ANDREJ");
        assert_eq!(clean_speaker_name("  EVA MALA  "), "EVA MALA");
        assert_eq!(clean_speaker_name("KAROL1"), "KAROL1");
    }

    #[test]
    fn test_is_valid_speaker_name() {
        assert!(is_valid_speaker_name("ANDREJ"));
        assert!(is_valid_speaker_name("JUANA DE ARAG"));
        assert!(!is_valid_speaker_name("INT."));
        assert!(!is_valid_speaker_name("TITULOK"));
        assert!(!is_valid_speaker_name(""));
        assert!(!is_valid_speaker_name(&"X".repeat(60)));
    }

    #[test]
    fn test_multi_speaker_fallback() {
        let caps = MULTI_SPEAKER_FALLBACK
            .captures("JAN,MARTIN,PETER,JOZO\tNeprideme tam ani my")
            .unwrap();
        assert_eq!(&caps[1], "JAN,MARTIN,PETER,JOZO");
        assert_eq!(&caps[2], "Neprideme tam ani my");

        // A single name must not match the multi pattern
        assert!(MULTI_SPEAKER_FALLBACK
            .captures("ANDREJ\tKde si bola?")
            .is_none());
    }

    #[test]
    fn test_single_speaker_fallbacks() {
        let caps = SPEAKER_SIMPLE_FALLBACK.captures("EVA\tNebola som doma.").unwrap();
        assert_eq!(caps[1].trim(), "EVA");
        assert_eq!(&caps[3], "Nebola som doma.");

        let caps = SPEAKER_COLON_FALLBACK.captures("ANDREJ: Kde si bola?").unwrap();
        assert_eq!(caps[1].trim(), "ANDREJ");
        assert_eq!(&caps[2], "Kde si bola?");

        let caps = SPEAKER_DASH_FALLBACK.captures("ANDREJ - Kde si bola?").unwrap();
        assert_eq!(caps[1].trim(), "ANDREJ");
        assert_eq!(&caps[2], "Kde si bola?");

        let caps = SPEAKER_PAREN_FALLBACK
            .captures("FERNANDO (MO)\tVstúpte.")
            .unwrap();
        assert_eq!(caps[1].trim(), "FERNANDO");
        assert_eq!(&caps[2], "(MO)");
        assert_eq!(&caps[3], "Vstúpte.");
    }

    #[test]
    fn test_speaker_alternation_escapes() {
        let names = vec!["EVA MALA".to_string(), "EVA".to_string()];
        let alt = speaker_alternation(&names);
        assert_eq!(alt, "EVA MALA|EVA");
    }
}
