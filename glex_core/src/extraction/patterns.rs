//! Pattern table definitions and the built-in extraction table.
//!
//! A pattern is a plain data row (name, match type, prefix, value, suffix).
//! The engine assembles each row into `(?P<prefix>…)(?P<value>…)(?P<suffix>…)`
//! and applies the table strictly in order, so a more specific pattern placed
//! earlier always wins over a broader one placed later.
//!
//! The built-in table is assembled from small regex building blocks: word
//! separators, whitelists of score words and primary/secondary/tertiary
//! keywords in Finnish, Swedish and English, and a typo-tolerant spelling of
//! the word "gleason". Every value must be anchored by such context; even
//! "3 + 3 = 6" is not matched without it. Missing a score is considered far
//! cheaper than collecting a false one.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::extraction::types::MatchType;

/// Definition of a single extraction pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDef {
    /// Unique name for this pattern.
    pub name: String,

    /// Which grammar parses the captured value string.
    pub match_type: String,

    /// Regex; context required before the value.
    pub prefix: String,

    /// Regex; the value itself.
    pub value: String,

    /// Regex; context required after the value.
    pub suffix: String,
}

impl PatternDef {
    /// Create a new pattern definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        match_type: impl Into<String>,
        prefix: impl Into<String>,
        value: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            match_type: match_type.into(),
            prefix: prefix.into(),
            value: value.into(),
            suffix: suffix.into(),
        }
    }

    /// Compile into an applicable pattern.
    ///
    /// # Errors
    /// Returns an error if the match type is unknown or the assembled regex
    /// does not compile.
    pub fn build(&self) -> Result<CompiledPattern> {
        let match_type = MatchType::from_str(&self.match_type).map_err(|_| {
            Error::UnknownMatchType {
                name: self.name.clone(),
                found: self.match_type.clone(),
            }
        })?;
        let full = format!(
            "(?P<prefix>{})(?P<value>{})(?P<suffix>{})",
            self.prefix, self.value, self.suffix
        );
        let regex = Regex::new(&full).map_err(|source| Error::InvalidPattern {
            name: self.name.clone(),
            source,
        })?;
        Ok(CompiledPattern {
            name: self.name.clone(),
            match_type,
            regex,
        })
    }
}

/// A validated, ready-to-apply pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub name: String,
    pub match_type: MatchType,
    pub regex: Regex,
}

/// Compile a whole table, enforcing unique pattern names.
///
/// # Errors
/// Returns an error on a duplicate name or an uncompilable row.
pub fn compile_table(defs: &[PatternDef]) -> Result<Vec<CompiledPattern>> {
    let mut seen = HashSet::new();
    let mut compiled = Vec::with_capacity(defs.len());
    for def in defs {
        if !seen.insert(def.name.clone()) {
            return Err(Error::DuplicatePatternName(def.name.clone()));
        }
        compiled.push(def.build()?);
    }
    Ok(compiled)
}

// regex building blocks ---------------------------------------------------

/// What must separate two words.
const WORD_SEP: &str = "[ ,-]{1,3}";

/// What may separate two words.
const OPTIONAL_WORD_SEP: &str = "[ ,-]{0,2}";

/// Characters a word may use in its body and inflected suffix. The dot
/// allows abbreviated forms such as "yht.pist.".
const WORD: &str = "[.a-zåäö]*";

/// What addition must look like.
const PLUS: &str = "[ ]?[+][ ]?";

/// How the equal sign is used in text.
const EQUALS: &str = "[ ]?[=][ ]?";

/// A single-digit number range in parenthesis, e.g. "( 3-5 )".
const NUMBER_RANGE_IN_PARENS: &str = "\\([ ]?[0-9]+[ ]?[-][ ]?[0-9]+[ ]?\\)";

/// Up to five arbitrary non-digit characters between two things.
const NONDIGIT_BUFFER_5: &str = "[^0-9]{0,5}";

/// Up to twenty arbitrary non-digit characters between two things.
const NONDIGIT_BUFFER_20: &str = "[^0-9]{0,20}";

/// Default right-hand context: the value must not continue as a number.
const DEFAULT_SUFFIX: &str = "([^0-9]|$)";

/// Any expression in parenthesis.
const EXPRESSION_IN_PARENS: &str = "\\([^)]*\\)";

/// Grades eligible as A, B or T.
const SCORE_A_OR_B: &str = "[3-5]";

/// Values eligible as the total score C.
const SCORE_C: &str = "(10|[6-9])";

/// Typo-tolerant spelling of the word "gleason".
pub(crate) const GLEASON_WORD: &str = "gl[aei]{1,2}s{1,2}[oi]n[a-zåäö]*";

/// "or most aggressive" tails after a primary/secondary keyword.
const OR_AGGRESSIVE: &str = "([ ]?(/|tai|eller)[ ]?aggres[.a-zåäö]*)?";

/// Roots of words referring to a score or grade.
const SCOREWORD_ROOTS: &[&str] = &[
    "pist",
    "tyyp",
    "luok",
    "score",
    "gr",
    "lk",
    "kl",
    "mö",
    "kuvio",
    "arkkitehtuuri",
];

/// Roots of words indicating the primary grade.
const PRIMARY_ROOTS: &[&str] = &[
    "prim[aä]{1,2}",
    "pääluok",
    "hufvudkl",
    "valtaos",
    "enimm",
    "tavalli",
    "vallits",
    "ylei",
    "hallits",
    "vanlig",
];

/// Roots of words associated with the total score. "gradus" appears here
/// because texts sometimes use it for the sum even though only A and B are
/// grades.
const SCORESUM_ROOTS: &[&str] = &["yh", "pist", "poäng", "sum", "score", "gradus"];

/// Separator allowed between whitelist entries.
const fn whitelist_sep() -> &'static str {
    "([ ,-]{0,2}| ja | tai | och | eller )"
}

/// One regex alternating over whitelist expressions, each optionally followed
/// by a separator, repeated per `count`.
fn whitelist_regex<S: AsRef<str>>(items: &[S], count: &str) -> String {
    let joined = items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("|");
    format!("(({joined}){}){count}", whitelist_sep())
}

/// A whitelist of word roots: each root may inflect via [`WORD`], repeat in
/// any order, and be separated by anything [`whitelist_sep`] accepts.
fn word_whitelist_regex<S: AsRef<str>>(items: &[S], count: &str) -> String {
    let joined = items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("|");
    format!("(({joined}){WORD}{}){count}", whitelist_sep())
}

/// Let a value expression repeat in sequence inside one capture, so e.g.
/// "3 + 4 / 4 + 3" is collected as one value string.
fn multi_alternative(value: &str) -> String {
    format!("{value}(( | / |/| tai | ja | eller | och | and | or |[ ]?-[ ]?){value})*")
}

/// Zero to three arbitrary natural-language words.
fn zero_to_three_words() -> String {
    format!("({WORD}{OPTIONAL_WORD_SEP}){{0,3}}")
}

fn scoreword_regex() -> String {
    word_whitelist_regex(SCOREWORD_ROOTS, "+")
}

/// Filler expressions which may sit between "gleason" and a value.
fn base_optional() -> Vec<String> {
    vec![
        scoreword_regex(),
        format!("n{WORD}"),
        NUMBER_RANGE_IN_PARENS.to_string(),
        EXPRESSION_IN_PARENS.to_string(),
    ]
}

/// The word "gleason" followed by optional filler words.
pub(crate) fn base_gleason_regex() -> String {
    format!(
        "{GLEASON_WORD}{OPTIONAL_WORD_SEP}{}",
        whitelist_regex(&base_optional(), "*")
    )
}

/// Like [`base_gleason_regex`] but agnostic about the order of "gleason" and
/// the filler words.
fn optional_base_gleason_regex() -> String {
    let mut items = base_optional();
    items.push(GLEASON_WORD.to_string());
    whitelist_regex(&items, "*")
}

fn primary_regex() -> String {
    format!("{}{OR_AGGRESSIVE}", word_whitelist_regex(PRIMARY_ROOTS, "+"))
}

/// The last five primary roots double as plain "most common" words.
const fn common_roots() -> &'static [&'static str] {
    let (_, tail) = PRIMARY_ROOTS.split_at(PRIMARY_ROOTS.len() - 5);
    tail
}

fn secondary_regex() -> String {
    let second_common = format!(
        "((2[.])|toise|näst)[.a-zåäö]*[ ]?{}",
        word_whitelist_regex(common_roots(), "+")
    );
    format!(
        "({second_common}|{}){OR_AGGRESSIVE}",
        word_whitelist_regex(&["sekund"], "+")
    )
}

fn scoresum_regex() -> String {
    word_whitelist_regex(SCORESUM_ROOTS, "+")
}

/// Words indicating the result of an addition.
fn total_words_regex() -> String {
    let mut roots: Vec<&str> = ["eli", "yht", "yhtä kuin", "pist", "sum", "total", "=", "sammanlag"]
        .iter()
        .chain(SCORESUM_ROOTS)
        .copied()
        .collect();
    roots.sort_unstable();
    roots.dedup();
    roots.sort_by_key(|root| std::cmp::Reverse(root.len()));
    word_whitelist_regex(&roots, "+")
}

// the built-in table ------------------------------------------------------

/// Addition patterns: the plethora of ways "A + B (= C)" appears in text,
/// tertiary-carrying variants first so they win over the plain additions.
fn addition_patterns() -> Vec<PatternDef> {
    let a_plus_b = format!("{SCORE_A_OR_B}{PLUS}{SCORE_A_OR_B}");
    let a_comma_b = format!("{SCORE_A_OR_B},[ ]?{SCORE_A_OR_B}");
    let a_plus_b_plus_t = format!("{a_plus_b}[ (]*[+][ ]?{SCORE_A_OR_B}[ )]*");
    let a_comma_b_comma_t = format!("{a_comma_b},[ ]?{SCORE_A_OR_B}");

    let prefix = format!("{}{}", base_gleason_regex(), zero_to_three_words());
    let opt_base = optional_base_gleason_regex();
    let totals = total_words_regex();

    let values = |addition: &str, comma_form: &str| {
        vec![
            format!(
                "{addition}{OPTIONAL_WORD_SEP}{opt_base}{totals}{opt_base}{OPTIONAL_WORD_SEP}{SCORE_C}"
            ),
            format!("{SCORE_C}{EQUALS}{addition}"),
            format!("{SCORE_C}[ ]?\\({addition}[ ]?\\)"),
            format!("{SCORE_C}[ ]?\\({comma_form}[ ]?\\)"),
            format!("{addition}[ ]?\\({SCORE_C}[ ]?\\)"),
            addition.to_string(),
        ]
    };

    let tertiary_names = [
        "a + b + t = c",
        "c = a + b + t",
        "c (a + b + t)",
        "c (a, b, t)",
        "a + b + t (c)",
        "a + b + t",
    ];
    let plain_names = [
        "a + b = c",
        "c = a + b",
        "c (a + b)",
        "c (a, b)",
        "a + b (c)",
        "a + b",
    ];

    let mut patterns = Vec::new();
    for (i, value) in values(&a_plus_b_plus_t, &a_comma_b_comma_t)
        .into_iter()
        .enumerate()
    {
        let match_type = if i == 5 { "a + b + t" } else { "a + b + t = c" };
        patterns.push(PatternDef::new(
            tertiary_names[i],
            match_type,
            prefix.clone(),
            format!("({value})"),
            DEFAULT_SUFFIX,
        ));
    }
    for (i, value) in values(&a_plus_b, &a_comma_b).into_iter().enumerate() {
        let match_type = if i == 5 { "a + b" } else { "a + b = c" };
        patterns.push(PatternDef::new(
            plain_names[i],
            match_type,
            prefix.clone(),
            format!("({value})"),
            DEFAULT_SUFFIX,
        ));
    }
    patterns
}

/// The "score sum near the end of the report" pattern.
fn minor_patterns() -> Vec<PatternDef> {
    vec![PatternDef::new(
        "sum_near_end",
        "c",
        format!("{}[ ]?", base_gleason_regex()),
        SCORE_C,
        "[^0-9]{0,30}$",
    )]
}

/// Keyword patterns: a primary/secondary/tertiary/total keyword anchoring a
/// bare value. Tertiary values are recognised mainly so they cannot pollute
/// neighbouring combinations.
fn keyword_patterns() -> Vec<PatternDef> {
    let base = base_gleason_regex();
    let opt_base = optional_base_gleason_regex();

    // monograde statements, e.g. "whole sample grade 4" -> 4+4
    let only_roots = ["yksinom", "ainoas", "pelk", "endast", "enbart"];
    let kw_all_a_prefix = format!(
        "{}{OPTIONAL_WORD_SEP}{base}{OPTIONAL_WORD_SEP}",
        word_whitelist_regex(&only_roots, "+")
    );

    let kw_a_prefix = format!(
        "{}{OPTIONAL_WORD_SEP}{opt_base}{OPTIONAL_WORD_SEP}{NONDIGIT_BUFFER_5}",
        primary_regex()
    );

    let kw_b_prefix = format!(
        "{}{WORD_SEP}((tai|/|eller) (pahin|korkein|högst)){{0,1}}{OPTIONAL_WORD_SEP}{opt_base}{OPTIONAL_WORD_SEP}{NONDIGIT_BUFFER_5}",
        secondary_regex()
    );

    // addition with letters, sometimes written out to guide the reader
    let addition_guide = "\\(?[ ]?(a|x)[ ]?[+][ ]?(b|y)[ ]?\\)?";
    let mut c_optional: Vec<String> = SCOREWORD_ROOTS
        .iter()
        .map(|root| format!("{root}{WORD}"))
        .collect();
    c_optional.push(addition_guide.to_string());
    c_optional.push(NUMBER_RANGE_IN_PARENS.to_string());
    c_optional.push(EXPRESSION_IN_PARENS.to_string());
    let c_optional_regex = whitelist_regex(&c_optional, "*");
    let kw_c_prefix = format!(
        "{c_optional_regex}{base}{c_optional_regex}{}{c_optional_regex}{OPTIONAL_WORD_SEP}{NONDIGIT_BUFFER_5}",
        scoresum_regex()
    );

    let mut tertiary_roots = vec!["terti".to_string()];
    tertiary_roots.extend(
        common_roots()
            .iter()
            .map(|root| format!("((3\\.)|(kolmann)|(trädj)){root}")),
    );
    let kw_t_prefix = format!(
        "{}{OPTIONAL_WORD_SEP}{opt_base}{OPTIONAL_WORD_SEP}",
        word_whitelist_regex(&tertiary_roots, "+")
    );

    let a_kw_prefix = format!("{base}{NONDIGIT_BUFFER_5}");
    let a_kw_suffix = format!("{OPTIONAL_WORD_SEP}{}", primary_regex());

    let c_kw_prefix = format!("{base}{OPTIONAL_WORD_SEP}{NONDIGIT_BUFFER_20}");
    let mut sum_suffix_roots: Vec<&str> = [
        "tauti",
        "syö",
        "prostata",
        "karsino{1,2}ma",
        "eturauhassyö",
        "adeno",
    ]
    .iter()
    .chain(SCOREWORD_ROOTS)
    .copied()
    .collect();
    sum_suffix_roots.sort_unstable();
    sum_suffix_roots.dedup();
    let c_kw_suffix = format!("{WORD_SEP}{}", word_whitelist_regex(&sum_suffix_roots, "+"));

    vec![
        PatternDef::new("kw_t", "t", kw_t_prefix, SCORE_A_OR_B, DEFAULT_SUFFIX),
        PatternDef::new("kw_b", "b", kw_b_prefix, SCORE_A_OR_B, DEFAULT_SUFFIX),
        PatternDef::new("kw_a", "a", kw_a_prefix, SCORE_A_OR_B, DEFAULT_SUFFIX),
        PatternDef::new("a_kw", "a", a_kw_prefix, SCORE_A_OR_B, a_kw_suffix),
        PatternDef::new("kw_c", "c", kw_c_prefix, SCORE_C, DEFAULT_SUFFIX),
        PatternDef::new("c_kw", "c", c_kw_prefix, SCORE_C, c_kw_suffix),
        PatternDef::new(
            "kw_all_a",
            "kw_all_a",
            kw_all_a_prefix,
            SCORE_A_OR_B,
            DEFAULT_SUFFIX,
        ),
    ]
}

/// The built-in pattern table.
///
/// Order matters: addition patterns (tertiary variants first), then the
/// sum-near-end pattern, then the keyword patterns. Every value regex is
/// wrapped so that several alternative value expressions in sequence are
/// captured as one value string.
#[must_use]
pub fn default_patterns() -> Vec<PatternDef> {
    let mut patterns = Vec::new();
    patterns.extend(addition_patterns());
    patterns.extend(minor_patterns());
    patterns.extend(keyword_patterns());
    for def in &mut patterns {
        def.value = multi_alternative(&def.value);
    }
    patterns
}
