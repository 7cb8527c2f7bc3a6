//! Ordered pattern application with text masking.
//!
//! Patterns claim stretches of text in table order; every claimed stretch is
//! overwritten with `_` before the search continues, so no later pattern (or
//! later occurrence of the same pattern) can match the same part of the text
//! twice. Masking replaces the matched byte span with an equal number of `_`
//! bytes, keeping the text length unchanged; spans recorded against the
//! working copy are therefore valid offsets into the original text.

use tracing::trace;

use crate::extraction::patterns::CompiledPattern;
use crate::extraction::types::RawMatch;

/// Apply `patterns` in table order to `text`.
///
/// Returns all matches sorted by appearance, together with the final masked
/// working text. At most `max_matches_per_pattern` occurrences are recorded
/// per pattern; a zero-length hit terminates that pattern's search since it
/// cannot be masked away.
#[must_use]
pub fn apply_patterns(
    text_id: i64,
    text: &str,
    patterns: &[CompiledPattern],
    max_matches_per_pattern: usize,
) -> (Vec<RawMatch>, String) {
    let mut working = text.to_string();
    let mut matches = Vec::new();

    for pattern in patterns {
        let mut tries = 0;
        while tries < max_matches_per_pattern {
            let Some((full_span, value_span, value)) = first_hit(&pattern.regex, &working) else {
                break;
            };
            if full_span.is_empty() {
                break;
            }
            trace!(
                text_id,
                pattern = %pattern.name,
                start = value_span.start,
                "recorded match"
            );
            matches.push(RawMatch {
                pattern_name: pattern.name.clone(),
                match_type: pattern.match_type,
                text_id,
                start: value_span.start,
                stop: value_span.end,
                value,
            });
            let mask = "_".repeat(full_span.len());
            working.replace_range(full_span, &mask);
            tries += 1;
        }
    }

    matches.sort_by_key(|m| m.start);
    (matches, working)
}

/// Full-match range, value range and value string of the first hit, if any.
fn first_hit(
    regex: &regex::Regex,
    working: &str,
) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>, String)> {
    let caps = regex.captures(working)?;
    let full = caps.get(0)?;
    let value = caps.name("value")?;
    Some((full.range(), value.range(), value.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::patterns::PatternDef;
    use crate::extraction::types::MatchType;

    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn compile(defs: &[PatternDef]) -> Vec<CompiledPattern> {
        crate::extraction::patterns::compile_table(defs).expect("test table should compile")
    }

    #[test]
    fn test_masking_prevents_rematch() {
        let table = compile(&[PatternDef::new(
            "ab",
            "a + b",
            "gleason ",
            "[3-5][ +]+[3-5]",
            "([^0-9]|$)",
        )]);
        let text = "gleason 4 + 3 and nothing else";
        let (matches, working) = apply_patterns(0, text, &table, 100);
        assert_eq!(matches.len(), 1);
        assert!(!table[0].regex.is_match(&working));
    }

    #[test]
    fn test_masking_preserves_length() {
        let table = compile(&[PatternDef::new(
            "ab",
            "a + b",
            "glieson näyte ",
            "[3-5][ +]+[3-5]",
            "([^0-9]|$)",
        )]);
        // multibyte letters before the value must not shift offsets
        let text = "glieson näyte 4 + 4 jotain";
        let (matches, working) = apply_patterns(0, text, &table, 100);
        assert_eq!(working.len(), text.len());
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].start..matches[0].stop], "4 + 4");
    }

    #[test]
    fn test_earlier_pattern_takes_priority() {
        // the first pattern matches a strict superset of the second
        let table = compile(&[
            PatternDef::new("abc", "a + b = c", "gleason ", "[3-5][ +]+[3-5] = (10|[6-9])", ""),
            PatternDef::new("ab", "a + b", "gleason ", "[3-5][ +]+[3-5]", ""),
        ]);
        let (matches, _) = apply_patterns(0, "gleason 4 + 3 = 7", &table, 100);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pattern_name, "abc");
        assert_eq!(matches[0].match_type, MatchType::APlusBEqualsC);
    }

    #[test]
    fn test_matches_are_sorted_by_appearance() {
        let table = compile(&[
            PatternDef::new("c", "c", "score ", "(10|[6-9])", ""),
            PatternDef::new("a", "a", "grade ", "[3-5]", ""),
        ]);
        let (matches, _) = apply_patterns(7, "grade 4 then score 9", &table, 100);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].pattern_name, "a");
        assert_eq!(matches[1].pattern_name, "c");
        assert!(matches[0].start < matches[1].start);
        assert_eq!(matches[0].text_id, 7);
    }

    #[test]
    fn test_max_matches_per_pattern_caps_extraction() {
        let table = compile(&[PatternDef::new("a", "a", "grade ", "[3-5]", "")]);
        let (matches, _) = apply_patterns(0, "grade 3 grade 4 grade 5", &table, 2);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_repeated_occurrences_are_all_recorded() {
        let table = compile(&[PatternDef::new(
            "ab",
            "a + b",
            "gleason ",
            "[3-5][ +]+[3-5]",
            "([^0-9]|$)",
        )]);
        let text = "gleason 4 + 3 something something gleason 4 + 4";
        let (matches, _) = apply_patterns(0, text, &table, 100);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].value, "4 + 3");
        assert_eq!(matches[1].value, "4 + 4");
    }
}
