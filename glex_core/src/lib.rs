#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation
)]

//! Rule-based extraction of Gleason scores from free-text pathology reports.
//!
//! The engine applies an ordered table of context-anchored regex patterns to
//! normalized report text, masking each claimed stretch so later patterns
//! cannot re-match it, parses every captured value string into typed score
//! components, and re-assembles loose components into coherent observations.

pub mod error;
pub mod extraction;
pub mod normalize;

pub use error::{Error, Result};
pub use extraction::engine::{EngineConfig, ExtractionEngine};
pub use extraction::patterns::{CompiledPattern, PatternDef, compile_table, default_patterns};
pub use extraction::types::{ComponentKind, MatchType, Observation, RawMatch, Warning};
pub use normalize::{normalize, prepare_text};
