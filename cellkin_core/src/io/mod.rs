//! Module for reading network definitions
pub mod json;

use thiserror::Error;

/// Errors raised while reading and validating a network definition
#[derive(Debug, Error)]
pub enum IoError {
    #[error("unable to read network definition file")]
    FileNotFound,
    #[error("unable to parse network definition: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("gene {gene} refers to unknown enzyme {enzyme}")]
    UnknownEnzyme { gene: String, enzyme: String },
    #[error("coupling refers to unknown reaction {0}")]
    UnknownReaction(String),
    #[error("reaction {0} has neither substrates nor products")]
    EmptyReaction(String),
    #[error("unknown regulator kind {0}, expected \"activator\" or \"repressor\"")]
    InvalidRegulatorKind(String),
}
