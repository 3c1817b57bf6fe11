use std::fmt;
use std::io;
use thiserror::Error;

/// Which request length bound a query violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBound {
    TooShort { min: usize },
    TooLong { max: usize },
}

impl fmt::Display for LengthBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthBound::TooShort { min } => {
                write!(f, "Minimal length of search request is: {min}")
            }
            LengthBound::TooLong { max } => write!(
                f,
                "The maximum length of search request has been exceeded ({max}).\n\
                 Try to reduce the number of characters"
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum TreefindError {
    #[error("{bound}")]
    InvalidInputLength { bound: LengthBound, len: usize },

    #[error("Invalid search column index is specified: {index} (tree has {column_count} columns)")]
    InvalidColumnIndex { index: usize, column_count: usize },

    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TreefindError>;
