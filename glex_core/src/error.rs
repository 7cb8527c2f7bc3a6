//! Fatal error types.
//!
//! Only malformed configuration (and duplicate batch ids) is an error.
//! Content-level problems never surface here; they are reported as warnings
//! on the affected output rows.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid regex in pattern `{name}`: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate pattern name: `{0}`")]
    DuplicatePatternName(String),

    #[error("unknown match type `{found}` in pattern `{name}`")]
    UnknownMatchType { name: String, found: String },

    #[error("invalid combination template: `{0}`")]
    InvalidTemplate(String),

    #[error("duplicate text id: {0}")]
    DuplicateTextId(i64),
}
