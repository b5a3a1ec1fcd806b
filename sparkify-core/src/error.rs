use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {} (line {line}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: ParseError,
    },

    #[error("Invalid data path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn parse(path: impl Into<PathBuf>, line: usize, source: ParseError) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            source,
        }
    }
}

/// Record-level failures. Missing and wrong-typed fields are kept apart so a
/// caller can tell a truncated record from a producer emitting a new shape.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` has the wrong type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("timestamp {ts} is out of range")]
    InvalidTimestamp { ts: i64 },
}
