// crates/rinexcheck-core/src/error.rs

use std::path::PathBuf;

use rinexcheck_parser::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parsing failed: {0}")]
    Parser(#[from] ParserError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Job file is invalid TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Job file serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("The reference file and the navigation log do not have matching epochs")]
    NoMatchingEpochs,

    #[error("No {axis} column for system '{system}' in the navigation log")]
    ColumnNotFound { system: String, axis: &'static str },

    #[error("Plot rendering failed: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
