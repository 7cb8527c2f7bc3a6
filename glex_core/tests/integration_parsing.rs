//! Value-string parsing fixtures.
//!
//! One table of captured value strings with their declared match types,
//! checked against the components the grammars should resolve.

use std::str::FromStr;

use glex_core::extraction::parser::parse_match;
use glex_core::{ComponentKind, MatchType, RawMatch};

fn raw(match_type: &str, value: &str) -> RawMatch {
    RawMatch {
        pattern_name: "fixture".to_string(),
        match_type: MatchType::from_str(match_type).expect("fixture match type should parse"),
        text_id: 0,
        start: 0,
        stop: value.len(),
        value: value.to_string(),
    }
}

#[test]
fn test_value_string_parsing_fixtures() {
    // (value string, match type, expected (kind, value) components in order)
    let fixtures: Vec<(&str, &str, Vec<(char, u8)>)> = vec![
        ("3 + 4 = 7", "a + b = c", vec![('a', 3), ('b', 4), ('c', 7)]),
        ("7", "c", vec![('c', 7)]),
        ("3 + 4 (7)", "a + b = c", vec![('a', 3), ('b', 4), ('c', 7)]),
        ("7 (3 + 4)", "a + b = c", vec![('a', 3), ('b', 4), ('c', 7)]),
        ("3 + 4", "a + b", vec![('a', 3), ('b', 4)]),
        (
            "3 + 4 gleason score 7",
            "a + b = c",
            vec![('a', 3), ('b', 4), ('c', 7)],
        ),
        (
            "3 + 4 (+5) = 7",
            "a + b + t = c",
            vec![('a', 3), ('b', 4), ('t', 5), ('c', 7)],
        ),
        ("3 + 4 (+5)", "a + b + t", vec![('a', 3), ('b', 4), ('t', 5)]),
        ("3+4+5", "a + b + t", vec![('a', 3), ('b', 4), ('t', 5)]),
        (
            "4+3+5, gleason score 7",
            "a + b + t = c",
            vec![('a', 4), ('b', 3), ('t', 5), ('c', 7)],
        ),
        ("5 4", "a", vec![('a', 5), ('a', 4)]),
        (
            "3 + 4 / 4 + 3",
            "a + b",
            vec![('a', 3), ('b', 4), ('a', 4), ('b', 3)],
        ),
        ("3", "kw_all_a", vec![('a', 3), ('b', 3)]),
    ];

    for (value, match_type, expected) in fixtures {
        let components = parse_match(&raw(match_type, value), 0);
        let produced: Vec<(char, u8)> = components
            .iter()
            .filter_map(|component| {
                component.value.map(|v| {
                    let kind = match component.kind {
                        ComponentKind::A => 'a',
                        ComponentKind::B => 'b',
                        ComponentKind::T => 't',
                        ComponentKind::C => 'c',
                    };
                    (kind, v)
                })
            })
            .collect();
        assert_eq!(produced, expected, "value string: {value:?} ({match_type})");
    }
}

#[test]
fn test_alternatives_split_into_separate_groups() {
    let components = parse_match(&raw("a + b", "3 + 4 / 4 + 3"), 0);
    let alts: Vec<usize> = components.iter().map(|c| c.alt).collect();
    assert_eq!(alts, vec![0, 0, 1, 1]);
}

#[test]
fn test_partial_parse_is_flagged() {
    let components = parse_match(&raw("a + b", "4"), 0);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].kind, ComponentKind::A);
    assert_eq!(components[0].value, Some(4));
    assert!(components[0].warning.is_some());
}
