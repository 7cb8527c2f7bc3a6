//! Match-type grammars: turning a captured value string into typed
//! components.
//!
//! Each match type declares a grammar regex with one named sub-capture per
//! component kind; alternation branches cover both value-first and
//! total-first orderings. The grammar is applied repeatedly, so one value
//! string holding several score expressions in sequence ("3 + 4 / 4 + 3")
//! yields one alternative per expression. When the grammar matches nothing
//! but digits are present, whatever classifies by value range is salvaged and
//! flagged rather than dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::types::{ComponentKind, MatchType, ParsedComponent, RawMatch, Warning};

/// Most alternatives one value string may contribute.
const MAX_ALTERNATIVES: usize = 10;

/// Grades eligible as A, B or T.
const GRADE: &str = "[3-5]";

/// Values eligible as the total score C.
const TOTAL: &str = "(?:10|[6-9])";

/// Separator between added grades; the comma covers "7 (3, 4)" layouts once
/// parentheses are stripped.
const SEP: &str = "[ ]?[+,][ ]?";

/// Non-digit stretch between the addition and the total score.
const GAP: &str = "[^0-9]*?";

#[expect(
    clippy::expect_used,
    reason = "grammar regexes are fixed strings known to compile"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static grammar regex must compile")
}

static AB: Lazy<Regex> = Lazy::new(|| compile(&format!("(?P<a>{GRADE}){SEP}(?P<b>{GRADE})")));

static ABT: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        "(?P<a>{GRADE}){SEP}(?P<b>{GRADE}){SEP}(?P<t>{GRADE})"
    ))
});

static ABC: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        "(?P<a>{GRADE}){SEP}(?P<b>{GRADE}){GAP}(?P<c>{TOTAL})|(?P<c>{TOTAL}){GAP}(?P<a>{GRADE}){SEP}(?P<b>{GRADE})"
    ))
});

static ABTC: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        "(?P<a>{GRADE}){SEP}(?P<b>{GRADE}){SEP}(?P<t>{GRADE}){GAP}(?P<c>{TOTAL})|(?P<c>{TOTAL}){GAP}(?P<a>{GRADE}){SEP}(?P<b>{GRADE}){SEP}(?P<t>{GRADE})"
    ))
});

static SINGLE_GRADE: Lazy<Regex> = Lazy::new(|| compile(&format!("(?P<v>{GRADE})")));

static SINGLE_TOTAL: Lazy<Regex> = Lazy::new(|| compile(&format!("(?P<v>{TOTAL})")));

static INTEGER: Lazy<Regex> = Lazy::new(|| compile("[0-9]+"));

/// Parse one raw match into typed components.
///
/// `source` is the index of the match within its text's match sequence; it
/// ties components back to their origin so compound alternatives can be kept
/// grouped downstream.
#[must_use]
pub fn parse_match(raw: &RawMatch, source: usize) -> Vec<ParsedComponent> {
    // parentheses carry no information once the value string is isolated
    let value_string: String = raw
        .value
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .collect();

    let mut components = Vec::new();
    match raw.match_type {
        MatchType::KwAllA => {
            // a monograde statement implies A = B
            if let Some(value) = SINGLE_GRADE
                .captures(&value_string)
                .and_then(|caps| capture_value(&caps, "v"))
            {
                for kind in [ComponentKind::A, ComponentKind::B] {
                    components.push(component(raw, source, 0, kind, value, None));
                }
            }
        }
        MatchType::A | MatchType::B | MatchType::T | MatchType::C => {
            let regex = if raw.match_type == MatchType::C {
                &SINGLE_TOTAL
            } else {
                &SINGLE_GRADE
            };
            let kind = raw.match_type.kinds()[0];
            for (alt, caps) in regex
                .captures_iter(&value_string)
                .take(MAX_ALTERNATIVES)
                .enumerate()
            {
                if let Some(value) = capture_value(&caps, "v") {
                    components.push(component(raw, source, alt, kind, value, None));
                }
            }
        }
        MatchType::APlusB => parse_compound(&AB, &value_string, raw, source, &mut components),
        MatchType::APlusBPlusT => parse_compound(&ABT, &value_string, raw, source, &mut components),
        MatchType::APlusBEqualsC => {
            parse_compound(&ABC, &value_string, raw, source, &mut components);
        }
        MatchType::APlusBPlusTEqualsC => {
            parse_compound(&ABTC, &value_string, raw, source, &mut components);
        }
    }
    components
}

/// Apply a compound grammar; fall back to partial recovery when it matches
/// nothing at all.
fn parse_compound(
    regex: &Regex,
    value_string: &str,
    raw: &RawMatch,
    source: usize,
    components: &mut Vec<ParsedComponent>,
) {
    let kinds = raw.match_type.kinds();
    let mut matched = false;
    for (alt, caps) in regex
        .captures_iter(value_string)
        .take(MAX_ALTERNATIVES)
        .enumerate()
    {
        matched = true;
        for kind in kinds {
            if let Some(value) = capture_value(&caps, kind.as_str()) {
                components.push(component(raw, source, alt, *kind, value, None));
            }
        }
    }
    if !matched {
        recover_partial(value_string, raw, source, components);
    }
}

/// Salvage what the grammar could not: assign integer tokens, in appearance
/// order, to the first unfilled grammar kind whose value range accepts them.
/// Every salvaged component is flagged.
fn recover_partial(
    value_string: &str,
    raw: &RawMatch,
    source: usize,
    components: &mut Vec<ParsedComponent>,
) {
    let kinds = raw.match_type.kinds();
    let mut filled = vec![false; kinds.len()];
    let warning = Some(Warning::PartialParse(raw.match_type));
    for token in INTEGER.find_iter(value_string) {
        let Ok(value) = token.as_str().parse::<u8>() else {
            continue;
        };
        let slot = kinds
            .iter()
            .enumerate()
            .find(|(i, kind)| !filled[*i] && kind.accepts(value));
        if let Some((i, kind)) = slot {
            filled[i] = true;
            components.push(component(raw, source, 0, *kind, value, warning));
        }
    }
}

fn capture_value(caps: &regex::Captures<'_>, name: &str) -> Option<u8> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

const fn component(
    raw: &RawMatch,
    source: usize,
    alt: usize,
    kind: ComponentKind,
    value: u8,
    warning: Option<Warning>,
) -> ParsedComponent {
    ParsedComponent {
        text_id: raw.text_id,
        start: raw.start,
        stop: raw.stop,
        kind,
        value: Some(value),
        source,
        alt,
        match_type: raw.match_type,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(match_type: MatchType, value: &str) -> RawMatch {
        RawMatch {
            pattern_name: "test".to_string(),
            match_type,
            text_id: 0,
            start: 0,
            stop: value.len(),
            value: value.to_string(),
        }
    }

    fn kinds_and_values(components: &[ParsedComponent]) -> Vec<(ComponentKind, Option<u8>)> {
        components.iter().map(|c| (c.kind, c.value)).collect()
    }

    #[test]
    fn test_a_plus_b_round_trip() {
        let components = parse_match(&raw(MatchType::APlusB, "4 + 3"), 0);
        assert_eq!(
            kinds_and_values(&components),
            vec![(ComponentKind::A, Some(4)), (ComponentKind::B, Some(3))]
        );
        assert!(components.iter().all(|c| c.warning.is_none()));
    }

    #[test]
    fn test_a_plus_b_equals_c_orderings() {
        for value in ["3 + 4 = 7", "7 = 3 + 4", "7 (3 + 4)", "7 (3,4)", "3 + 4 (7)"] {
            let components = parse_match(&raw(MatchType::APlusBEqualsC, value), 0);
            assert_eq!(
                kinds_and_values(&components),
                vec![
                    (ComponentKind::A, Some(3)),
                    (ComponentKind::B, Some(4)),
                    (ComponentKind::C, Some(7)),
                ],
                "value: {value}"
            );
        }
    }

    #[test]
    fn test_a_plus_b_equals_c_with_words_between() {
        let components = parse_match(&raw(MatchType::APlusBEqualsC, "3 + 4 gleason score 7"), 0);
        assert_eq!(
            kinds_and_values(&components),
            vec![
                (ComponentKind::A, Some(3)),
                (ComponentKind::B, Some(4)),
                (ComponentKind::C, Some(7)),
            ]
        );
    }

    #[test]
    fn test_tertiary_grammars() {
        let components = parse_match(&raw(MatchType::APlusBPlusT, "3+4+5"), 0);
        assert_eq!(
            kinds_and_values(&components),
            vec![
                (ComponentKind::A, Some(3)),
                (ComponentKind::B, Some(4)),
                (ComponentKind::T, Some(5)),
            ]
        );

        let components = parse_match(&raw(MatchType::APlusBPlusTEqualsC, "3 + 4 (+5) = 7"), 0);
        assert_eq!(
            kinds_and_values(&components),
            vec![
                (ComponentKind::A, Some(3)),
                (ComponentKind::B, Some(4)),
                (ComponentKind::T, Some(5)),
                (ComponentKind::C, Some(7)),
            ]
        );

        let components = parse_match(
            &raw(MatchType::APlusBPlusTEqualsC, "4+3+5, gleason score 7"),
            0,
        );
        assert_eq!(
            kinds_and_values(&components),
            vec![
                (ComponentKind::A, Some(4)),
                (ComponentKind::B, Some(3)),
                (ComponentKind::T, Some(5)),
                (ComponentKind::C, Some(7)),
            ]
        );
    }

    #[test]
    fn test_multiple_alternatives_in_one_value_string() {
        let components = parse_match(&raw(MatchType::APlusB, "3 + 4 / 4 + 3"), 0);
        assert_eq!(
            kinds_and_values(&components),
            vec![
                (ComponentKind::A, Some(3)),
                (ComponentKind::B, Some(4)),
                (ComponentKind::A, Some(4)),
                (ComponentKind::B, Some(3)),
            ]
        );
        assert_eq!(components[0].alt, 0);
        assert_eq!(components[2].alt, 1);
    }

    #[test]
    fn test_single_kind_yields_one_component_per_occurrence() {
        let components = parse_match(&raw(MatchType::A, "5 4"), 0);
        assert_eq!(
            kinds_and_values(&components),
            vec![(ComponentKind::A, Some(5)), (ComponentKind::A, Some(4))]
        );

        let components = parse_match(&raw(MatchType::C, "7"), 0);
        assert_eq!(kinds_and_values(&components), vec![(ComponentKind::C, Some(7))]);
    }

    #[test]
    fn test_kw_all_a_implies_equal_grades() {
        let components = parse_match(&raw(MatchType::KwAllA, "3"), 0);
        assert_eq!(
            kinds_and_values(&components),
            vec![(ComponentKind::A, Some(3)), (ComponentKind::B, Some(3))]
        );
        // both components belong to the same alternative
        assert!(components.iter().all(|c| c.alt == 0));
    }

    #[test]
    fn test_partial_recovery_keeps_what_parses() {
        // a lone total inside an addition grammar
        let components = parse_match(&raw(MatchType::APlusBEqualsC, "7"), 0);
        assert_eq!(kinds_and_values(&components), vec![(ComponentKind::C, Some(7))]);
        assert_eq!(
            components[0].warning,
            Some(Warning::PartialParse(MatchType::APlusBEqualsC))
        );

        // a lone grade inside an addition grammar
        let components = parse_match(&raw(MatchType::APlusB, "3"), 0);
        assert_eq!(kinds_and_values(&components), vec![(ComponentKind::A, Some(3))]);
        assert_eq!(
            components[0].warning,
            Some(Warning::PartialParse(MatchType::APlusB))
        );
    }

    #[test]
    fn test_unparsable_value_string_yields_nothing() {
        assert!(parse_match(&raw(MatchType::APlusB, "no digits here"), 0).is_empty());
    }

    #[test]
    fn test_components_share_the_match_span() {
        let components = parse_match(&raw(MatchType::APlusBEqualsC, "3 + 4 = 7"), 3);
        assert!(components.iter().all(|c| c.start == 0 && c.stop == 9));
        assert!(components.iter().all(|c| c.source == 3));
    }
}
