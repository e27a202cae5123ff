//! Error types for ROW reading and writing.
//!
//! ## Error Categories
//!
//! - **Schema Errors**: missing header/type line, unknown type tag, names and
//!   types of different lengths
//! - **Arity Errors**: a record with the wrong number of fields
//! - **Conversion Errors**: a token that cannot be parsed as its column type,
//!   or a value that does not fit its column type
//! - **I/O Errors**: failures of the underlying byte source or sink
//!
//! Errors raised while reading carry the 1-based line number of the offending
//! line.
//!
//! ## Examples
//!
//! ```rust
//! use row_format::{parse, Error};
//!
//! let result = parse("only\tnames\n");
//! assert!(matches!(result, Err(Error::MalformedSchema(_))));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors raised by the ROW codec.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error from the underlying source or sink
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Header or type line missing, or a declared type is not known
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    /// A type tag outside the closed vocabulary
    #[error("Unknown type tag '{0}' (expected one of bool, int, float, date, datetime, text, binary)")]
    UnknownType(String),

    /// Field names and field types supplied to a writer do not line up
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A record handed to a writer does not match the schema's shape
    #[error("Arity mismatch: {0}")]
    ArityMismatch(String),

    /// A data line with a different number of tokens than the schema declares
    #[error("Line {line}: expected {expected} fields, found {found}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A token or value that cannot be converted to its column type
    #[error("Conversion error{}: field '{field}' of type {tag}: cannot convert {found}: {reason}", fmt_line(.line))]
    Conversion {
        line: Option<usize>,
        field: String,
        tag: &'static str,
        found: String,
        reason: String,
    },

    /// A line that is not valid UTF-8
    #[error("Line {line}: invalid UTF-8: {reason}")]
    Encoding { line: usize, reason: String },

    /// Operation on a writer that has already been closed
    #[error("Writer is closed")]
    Closed,
}

fn fmt_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

impl Error {
    /// Creates a malformed schema error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use row_format::Error;
    ///
    /// let err = Error::malformed_schema("missing type line");
    /// assert!(err.to_string().contains("missing type line"));
    /// ```
    pub fn malformed_schema<T: fmt::Display>(msg: T) -> Self {
        Error::MalformedSchema(msg.to_string())
    }

    pub fn schema_mismatch<T: fmt::Display>(msg: T) -> Self {
        Error::SchemaMismatch(msg.to_string())
    }

    /// Creates an arity error for a positional record of the wrong length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use row_format::Error;
    ///
    /// let err = Error::arity(2, 3);
    /// assert!(err.to_string().contains("expected 2 values, got 3"));
    /// ```
    pub fn arity(expected: usize, found: usize) -> Self {
        Error::ArityMismatch(format!("expected {} values, got {}", expected, found))
    }

    /// Creates an arity error for a dict record lacking a schema field.
    pub fn missing_field(name: &str) -> Self {
        Error::ArityMismatch(format!("record has no value for field '{}'", name))
    }

    /// Creates an arity error for a dict record carrying a key outside the schema.
    pub fn unexpected_field(name: &str) -> Self {
        Error::ArityMismatch(format!("record has a value for unknown field '{}'", name))
    }

    /// Creates a conversion error without field or line context.
    ///
    /// The reader and writer attach the context through [`Error::at_field`]
    /// and [`Error::at_line`].
    pub fn conversion<T: fmt::Display>(tag: &'static str, found: &str, reason: T) -> Self {
        Error::Conversion {
            line: None,
            field: String::new(),
            tag,
            found: found.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn encoding<T: fmt::Display>(line: usize, reason: T) -> Self {
        Error::Encoding {
            line,
            reason: reason.to_string(),
        }
    }

    /// Attaches a field name to a conversion error; other errors pass through.
    pub fn at_field(self, name: &str) -> Self {
        match self {
            Error::Conversion {
                line,
                tag,
                found,
                reason,
                ..
            } => Error::Conversion {
                line,
                field: name.to_string(),
                tag,
                found,
                reason,
            },
            other => other,
        }
    }

    /// Attaches a line number to a conversion error; other errors pass through.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Error::Conversion {
                field,
                tag,
                found,
                reason,
                ..
            } => Error::Conversion {
                line: Some(line),
                field,
                tag,
                found,
                reason,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
