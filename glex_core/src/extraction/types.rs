//! Core data types of the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One element of a Gleason score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ComponentKind {
    /// Primary (most prevalent) grade.
    A = 0,
    /// Secondary grade.
    B = 1,
    /// Tertiary grade.
    T = 2,
    /// Total score (the sum A + B).
    C = 3,
}

impl ComponentKind {
    /// Returns the string representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::T => "t",
            Self::C => "c",
        }
    }

    /// Parse a kind from a single letter.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'a' | 'A' => Some(Self::A),
            'b' | 'B' => Some(Self::B),
            't' | 'T' => Some(Self::T),
            'c' | 'C' => Some(Self::C),
            _ => None,
        }
    }

    /// Whether `value` lies inside the value range this kind accepts.
    ///
    /// Grades run 3-5 and total scores 6-10; the ranges are disjoint, so a
    /// bare integer classifies unambiguously.
    #[must_use]
    pub const fn accepts(&self, value: u8) -> bool {
        match self {
            Self::A | Self::B | Self::T => value >= 3 && value <= 5,
            Self::C => value >= 6 && value <= 10,
        }
    }
}

impl FromStr for ComponentKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or("unknown component kind"),
            _ => Err("unknown component kind"),
        }
    }
}

/// Which grammar a matched value string is parsed with.
///
/// Compound match types carry several components in one value string and
/// keep them grouped; single-kind types contribute loose components to the
/// combination scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// Additions such as "3 + 4".
    APlusB,
    /// Additions carrying a tertiary grade, "3 + 4 + 5".
    APlusBPlusT,
    /// Additions carrying the total, "3 + 4 = 7" and its permutations.
    APlusBEqualsC,
    /// Additions with tertiary grade and total, "3 + 4 (+5) = 7".
    APlusBPlusTEqualsC,
    /// Monograde statements ("only grade 4 seen"); implies A = B.
    KwAllA,
    /// A bare primary grade.
    A,
    /// A bare secondary grade.
    B,
    /// A bare tertiary grade.
    T,
    /// A bare total score.
    C,
}

impl MatchType {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::APlusB => "a + b",
            Self::APlusBPlusT => "a + b + t",
            Self::APlusBEqualsC => "a + b = c",
            Self::APlusBPlusTEqualsC => "a + b + t = c",
            Self::KwAllA => "kw_all_a",
            Self::A => "a",
            Self::B => "b",
            Self::T => "t",
            Self::C => "c",
        }
    }

    /// Component kinds of this grammar, in resolution order.
    #[must_use]
    pub const fn kinds(&self) -> &'static [ComponentKind] {
        match self {
            Self::APlusB | Self::KwAllA => &[ComponentKind::A, ComponentKind::B],
            Self::APlusBPlusT => &[ComponentKind::A, ComponentKind::B, ComponentKind::T],
            Self::APlusBEqualsC => &[ComponentKind::A, ComponentKind::B, ComponentKind::C],
            Self::APlusBPlusTEqualsC => &[
                ComponentKind::A,
                ComponentKind::B,
                ComponentKind::T,
                ComponentKind::C,
            ],
            Self::A => &[ComponentKind::A],
            Self::B => &[ComponentKind::B],
            Self::T => &[ComponentKind::T],
            Self::C => &[ComponentKind::C],
        }
    }

    /// Compound match types keep their components grouped into one
    /// observation; single-kind types do not.
    #[must_use]
    pub const fn is_compound(&self) -> bool {
        !matches!(self, Self::A | Self::B | Self::T | Self::C)
    }
}

impl FromStr for MatchType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        match key.as_str() {
            "a+b" | "a_and_b" => Ok(Self::APlusB),
            "a+b+t" => Ok(Self::APlusBPlusT),
            "a+b=c" => Ok(Self::APlusBEqualsC),
            "a+b+t=c" => Ok(Self::APlusBPlusTEqualsC),
            "kw_all_a" => Ok(Self::KwAllA),
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            "t" => Ok(Self::T),
            "c" => Ok(Self::C),
            _ => Err("unknown match type"),
        }
    }
}

/// Non-fatal data-quality flags attached to output rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// A compound grammar resolved fewer components than it declares.
    PartialParse(MatchType),
    /// Repeated values of one kind inside a combined group disagreed; the
    /// first occurrence was kept.
    InconsistentRepeat(ComponentKind),
    /// A, B and C are all present but `c != a + b`.
    ScoreMismatch,
    /// A single component matched no combination template and is reported
    /// alone.
    UngroupedComponent,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PartialParse(mt) => {
                write!(f, "incomplete parse for match type `{}`", mt.as_str())
            }
            Self::InconsistentRepeat(kind) => {
                write!(f, "inconsistent repeated values for kind `{}`", kind.as_str())
            }
            Self::ScoreMismatch => write!(f, "a + b != c"),
            Self::UngroupedComponent => {
                write!(f, "component not matched by any combination template")
            }
        }
    }
}

/// The four score slots of one observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreSet {
    pub a: Option<u8>,
    pub b: Option<u8>,
    pub t: Option<u8>,
    pub c: Option<u8>,
}

impl ScoreSet {
    /// Read the slot for `kind`.
    #[must_use]
    pub const fn get(&self, kind: ComponentKind) -> Option<u8> {
        match kind {
            ComponentKind::A => self.a,
            ComponentKind::B => self.b,
            ComponentKind::T => self.t,
            ComponentKind::C => self.c,
        }
    }

    /// Fill the slot for `kind` unless it already holds a value.
    pub const fn fill(&mut self, kind: ComponentKind, value: u8) {
        let slot = match kind {
            ComponentKind::A => &mut self.a,
            ComponentKind::B => &mut self.b,
            ComponentKind::T => &mut self.t,
            ComponentKind::C => &mut self.c,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }
}

/// One pattern hit against a text.
///
/// `start`/`stop` are byte offsets of the value capture in the original
/// (pre-masking) normalized text. Masking never changes text length, so the
/// offsets recorded against the working copy stay valid.
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub pattern_name: String,
    pub match_type: MatchType,
    pub text_id: i64,
    pub start: usize,
    pub stop: usize,
    /// The captured value substring, context stripped.
    pub value: String,
}

/// One typed score component parsed out of a raw match.
#[derive(Debug, Clone)]
pub struct ParsedComponent {
    pub text_id: i64,
    pub start: usize,
    pub stop: usize,
    pub kind: ComponentKind,
    pub value: Option<u8>,
    /// Index of the source match within the text's match sequence.
    pub source: usize,
    /// Alternative index when one value string held several score
    /// expressions in sequence ("3 + 4 / 4 + 3").
    pub alt: usize,
    pub match_type: MatchType,
    pub warning: Option<Warning>,
}

/// A set of components believed to belong to one observation.
#[derive(Debug, Clone)]
pub struct ObservationGroup {
    pub text_id: i64,
    pub scores: ScoreSet,
    pub start: usize,
    pub stop: usize,
    /// Source match type for pass-through groups; the consumed kind letters
    /// (e.g. "aabb") for groups assembled by the combination scan.
    pub label: String,
    pub warnings: Vec<Warning>,
}

/// One output row of the extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    pub text_id: i64,
    /// `text_id * 1000` plus the 0-based order of appearance within the text.
    pub obs_id: i64,
    pub a: Option<u8>,
    pub b: Option<u8>,
    pub t: Option<u8>,
    pub c: Option<u8>,
    pub start: usize,
    pub stop: usize,
    pub match_type: String,
    pub warning: Option<String>,
}
