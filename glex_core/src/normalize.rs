//! Text preparation ahead of extraction.
//!
//! The engine consumes already-normalized text; these helpers are the
//! preprocessing step that produces it. [`normalize`] is purely mechanical
//! clean-up; [`prepare_text`] additionally trims expressions known to cause
//! false positives, such as form field names that embed a grade range.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::patterns::{GLEASON_WORD, base_gleason_regex};

#[expect(
    clippy::expect_used,
    reason = "normalization regexes are fixed strings known to compile"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static normalization regex must compile")
}

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| compile("[\\n\\r]"));
static COLON_RUNS: Lazy<Regex> = Lazy::new(|| compile("[: ]{1,}"));
static DOT_RUNS: Lazy<Regex> = Lazy::new(|| compile("\\.{2,}"));
static UNDERSCORE_RUNS: Lazy<Regex> = Lazy::new(|| compile("_+"));
static DASH_RUNS: Lazy<Regex> = Lazy::new(|| compile("-{2,}"));
static DIGIT_LETTER: Lazy<Regex> = Lazy::new(|| compile("([0-9])([a-zåäöA-ZÅÄÖ])"));
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| compile("\\s+"));
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| compile("[ ]+"));

/// Expressions that look like scores but never are. Field names such as
/// "gleason 6 or less" were a notable source of false alarms.
static ENUMERATED_GRADES: Lazy<Regex> =
    Lazy::new(|| compile(&format!("{}[ ]?4[ ](ja|tai|or|och|eller)[ ]5", base_gleason_regex())));
static FOCAL_CANCER_NOTE: Lazy<Regex> = Lazy::new(|| compile("fokaalinen syöpä \\([^)]*\\)"));
static SIX_OR_LESS_NOTE: Lazy<Regex> = Lazy::new(|| compile("\\(gleason score 6 tai alle\\)"));
static WORDS_IN_PARENS: Lazy<Regex> = Lazy::new(|| compile("\\([^0-9]+\\)"));
static PERCENT_IN_PARENS: Lazy<Regex> = Lazy::new(|| compile("\\([ ]*[0-9]+[ ]*%[ ]*\\)"));
/// Field names carrying a grade range, e.g. "Is bad (Gleason score 9-10): no".
static FIELD_NAME_GRADE_RANGE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        "[(][ ]*{GLEASON_WORD}[^0-9]*[5-9][ ]*[-][ ]*([6-9]|(10))[ ]*[)]"
    ))
});

const ROMAN_NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// Mechanical normalization: join lines, collapse separators, space out
/// digit-letter boundaries, convert standalone roman numerals, lowercase.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = LINE_BREAKS.replace_all(text, " ").into_owned();
    out = COLON_RUNS.replace_all(&out, " ").into_owned();
    out = DOT_RUNS.replace_all(&out, " ").into_owned();
    out = UNDERSCORE_RUNS.replace_all(&out, " ").into_owned();
    out = DASH_RUNS.replace_all(&out, " ").into_owned();
    out = DIGIT_LETTER.replace_all(&out, "$1 $2").into_owned();
    for (i, numeral) in ROMAN_NUMERALS.iter().enumerate() {
        out = out.replace(&format!(" {numeral} "), &format!(" {} ", i + 1));
    }
    out = WHITESPACE_RUNS.replace_all(&out, " ").into_owned();
    out.to_lowercase()
}

/// Remove known false-positive score mentions from normalized text.
fn remove_false_positives(text: &str) -> String {
    let mut out = ENUMERATED_GRADES.replace_all(text, "").into_owned();
    out = FOCAL_CANCER_NOTE.replace_all(&out, "").into_owned();
    SIX_OR_LESS_NOTE.replace_all(&out, "").into_owned()
}

/// Normalize and trim a raw report for extraction.
///
/// Beyond [`normalize`], score-free parentheticals, percentages in
/// parentheses and grade-range field names are dropped to shorten and
/// simplify the text.
#[must_use]
pub fn prepare_text(text: &str) -> String {
    let mut out = remove_false_positives(&normalize(text));
    out = WORDS_IN_PARENS.replace_all(&out, " ").into_owned();
    out = PERCENT_IN_PARENS.replace_all(&out, " ").into_owned();
    out = FIELD_NAME_GRADE_RANGE.replace_all(&out, " ").into_owned();
    SPACE_RUNS.replace_all(&out, " ").into_owned()
}
