//! The extraction pipeline: pattern table, masking extractor, value parser,
//! combination engine and output assembler.

pub mod assemble;
pub mod combine;
pub mod engine;
pub mod masking;
pub mod parser;
pub mod patterns;
pub mod types;

pub use engine::{EngineConfig, ExtractionEngine};
pub use patterns::{CompiledPattern, PatternDef, compile_table, default_patterns};
pub use types::{ComponentKind, MatchType, Observation, RawMatch, Warning};
