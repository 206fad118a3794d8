use std::fmt;

use thiserror::Error;

/// Why one navigation log format declined a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserAttempt {
    pub format: &'static str,
    pub reason: String,
}

impl ParserAttempt {
    pub fn new(format: &'static str, reason: impl Into<String>) -> Self {
        Self {
            format,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParserAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.format, self.reason)
    }
}

fn list_attempts(attempts: &[ParserAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ParserError {
    /// The file is not of this format; the registry moves on to the next one.
    #[error("not a {format} file: {reason}")]
    FormatMismatch {
        format: &'static str,
        reason: String,
    },

    #[error("{format} header is invalid: {message}")]
    InvalidHeader {
        format: &'static str,
        message: String,
    },

    #[error("{format} file could not be split into fields: {source}")]
    Csv {
        format: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{format} line {line_index}: {message}")]
    DataRow {
        format: &'static str,
        line_index: usize,
        message: String,
    },

    #[error("{format} table could not be built: {message}")]
    Validation {
        format: &'static str,
        message: String,
    },

    #[error("{format} file has no '{column}' column")]
    MissingColumn {
        format: &'static str,
        column: String,
    },

    #[error("{format} file has a header but no epochs")]
    EmptyData { format: &'static str },

    #[error("navigation log format not recognised: {}", list_attempts(.attempts))]
    NoMatchingParser { attempts: Vec<ParserAttempt> },
}
