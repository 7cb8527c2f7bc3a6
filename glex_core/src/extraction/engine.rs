//! The extraction engine: configuration, compilation and the per-text
//! pipeline.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::extraction::combine::{self, Template};
use crate::extraction::patterns::{self, CompiledPattern, PatternDef};
use crate::extraction::types::Observation;
use crate::extraction::{assemble, masking, parser};

/// Configuration for the extraction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pattern table rows, applied in order.
    pub patterns: Vec<PatternDef>,

    /// Combination templates as kind letters (e.g. `"cab"`), most specific
    /// first.
    #[serde(default = "combine::default_templates")]
    pub templates: Vec<String>,

    /// Most each-style repeats tried per template.
    #[serde(default = "default_max_repeats")]
    pub max_repeats: usize,

    /// Most matches recorded per pattern per text.
    #[serde(default = "default_max_matches")]
    pub max_matches_per_pattern: usize,
}

const fn default_max_repeats() -> usize {
    5
}

const fn default_max_matches() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            patterns: patterns::default_patterns(),
            templates: combine::default_templates(),
            max_repeats: default_max_repeats(),
            max_matches_per_pattern: default_max_matches(),
        }
    }
}

/// Applies a compiled pattern table to texts and assembles observations.
///
/// The engine is immutable once built; texts are independent of each other,
/// so batch extraction runs data-parallel over them.
pub struct ExtractionEngine {
    patterns: Vec<CompiledPattern>,
    templates: Vec<Template>,
    max_repeats: usize,
    max_matches_per_pattern: usize,
}

impl ExtractionEngine {
    /// Create a new extraction engine from configuration.
    ///
    /// # Errors
    /// Returns an error if a pattern or template fails to compile, a pattern
    /// name repeats, or a match type is unknown.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let patterns = patterns::compile_table(&config.patterns)?;
        let templates = config
            .templates
            .iter()
            .map(|letters| Template::parse(letters))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            patterns,
            templates,
            max_repeats: config.max_repeats.max(1),
            max_matches_per_pattern: config.max_matches_per_pattern.max(1),
        })
    }

    /// Create an engine with the built-in pattern table.
    ///
    /// # Errors
    /// Returns an error if the built-in table fails to compile.
    pub fn with_defaults() -> Result<Self> {
        Self::new(EngineConfig::default())
    }

    /// The compiled pattern table, in application order.
    #[must_use]
    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Extract all observations from one already-normalized text.
    #[must_use]
    pub fn extract_text(&self, text_id: i64, text: &str) -> Vec<Observation> {
        let (matches, _working) = masking::apply_patterns(
            text_id,
            text,
            &self.patterns,
            self.max_matches_per_pattern,
        );
        debug!(text_id, matches = matches.len(), "pattern application done");

        let mut components = Vec::new();
        for (source, raw) in matches.iter().enumerate() {
            components.extend(parser::parse_match(raw, source));
        }
        let groups = combine::combine(&components, &self.templates, self.max_repeats);
        assemble::assemble(text_id, groups)
    }

    /// Extract from many texts in parallel.
    ///
    /// Output rows keep the input text order; within a text they are ordered
    /// by `obs_id`.
    ///
    /// # Errors
    /// Returns an error when two texts share an id.
    pub fn extract_batch(&self, texts: &[(i64, String)]) -> Result<Vec<Observation>> {
        let mut seen = HashSet::new();
        for (text_id, _) in texts {
            if !seen.insert(*text_id) {
                return Err(Error::DuplicateTextId(*text_id));
            }
        }
        info!(
            texts = texts.len(),
            patterns = self.patterns.len(),
            "starting batch extraction"
        );
        Ok(texts
            .par_iter()
            .map(|(text_id, text)| self.extract_text(*text_id, text))
            .flatten()
            .collect())
    }
}
