// Error types for the TRC reader

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrcError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("WAVEDESC marker not found in the first {searched} bytes")]
    MissingMarker { searched: usize },

    #[error("Input truncated while reading {field} at offset {offset}")]
    TruncatedInput { field: &'static str, offset: u64 },

    #[error("Invalid {field} index {index} at offset {offset} (table has {table_len} entries)")]
    InvalidEnum {
        field: &'static str,
        index: u16,
        offset: u64,
        table_len: usize,
    },

    #[error("Invalid text in {field} at offset {offset}: {reason}")]
    InvalidText {
        field: &'static str,
        offset: u64,
        reason: String,
    },

    #[error("Invalid {field} length {length} at offset {offset}")]
    InvalidLength {
        field: &'static str,
        offset: u64,
        length: i64,
    },

    #[error("Invalid {field} at offset {offset}: {reason}")]
    InvalidTimestamp {
        field: &'static str,
        offset: u64,
        reason: String,
    },

    #[error("Unsupported template: {0}")]
    UnsupportedTemplate(String),
}

/// Coarse classification of a [`TrcError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes do not follow the WAVEDESC layout.
    Format,
    /// A read ran past the end of the input.
    Truncated,
    /// The underlying source could not be opened or read.
    Io,
}

impl TrcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrcError::Io(_) => ErrorKind::Io,
            TrcError::TruncatedInput { .. } => ErrorKind::Truncated,
            TrcError::MissingMarker { .. }
            | TrcError::InvalidEnum { .. }
            | TrcError::InvalidText { .. }
            | TrcError::InvalidLength { .. }
            | TrcError::InvalidTimestamp { .. }
            | TrcError::UnsupportedTemplate(_) => ErrorKind::Format,
        }
    }

    /// Map an IO error raised while reading `field`, turning EOF into truncation.
    pub(crate) fn from_read(err: io::Error, field: &'static str, offset: u64) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            TrcError::TruncatedInput { field, offset }
        } else {
            TrcError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, TrcError>;
