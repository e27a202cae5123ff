//! # row_format
//!
//! Reader and writer for ROW, a line-oriented tabular text format.
//!
//! ## What is ROW?
//!
//! ROW is tab-separated text with two additions: the second line declares a
//! type for every column, and field values use a reversible escape scheme so
//! that tabs, newlines and `#` can appear in data. Lines starting with `#` are
//! comments and blank lines are ignored. A ROW stream may be gzip-compressed;
//! readers detect that from the magic bytes.
//!
//! ```text
//! city<TAB>inhabitants<TAB>area
//! text<TAB>int<TAB>float
//! # Rio de Janeiro state
//! Niterói<TAB>487562<TAB>133.9
//! ```
//!
//! ## Key Features
//!
//! - **Typed columns**: `bool`, `int`, `float`, `date`, `datetime`, `text`, `binary`
//! - **Null support**: `\N` is null in a column of any type
//! - **Streaming**: [`Reader`] and [`Writer`] process one record at a time
//! - **Dict records**: [`DictReader`] and [`DictWriter`] work with name-keyed [`RowMap`]s
//! - **Transparent gzip**: compressed input is decompressed on read
//!
//! ## Quick Start
//!
//! ### Bulk parsing
//!
//! ```rust
//! use row_format::{parse, Value};
//!
//! let text = "a\tb\nint\ttext\n123\thi\n";
//! let rows = parse(text).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0]["a"], Value::Integer(123));
//! assert_eq!(rows[0]["b"], Value::from("hi"));
//! ```
//!
//! ### Writing and reading back
//!
//! ```rust
//! use row_format::{row, Reader, TypeTag, Writer};
//!
//! let mut writer = Writer::new(Vec::new(), ["a", "b"], [TypeTag::Int, TypeTag::Text]).unwrap();
//! writer.write_row(&row![123, "hi"]).unwrap();
//! let bytes = writer.into_inner().unwrap();
//!
//! let records: Vec<_> = Reader::new(&bytes[..])
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(records, vec![row![123, "hi"]]);
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result`]. Schema problems are reported before any
//! record is produced; conversion problems are reported on the record that
//! fails, with its line number.

pub mod error;
pub mod escape;
pub mod line;
pub mod macros;
pub mod map;
pub mod options;
pub mod read;
pub mod schema;
pub mod types;
pub mod value;
pub mod write;

pub use error::{Error, Result};
pub use map::RowMap;
pub use options::RowOptions;
pub use read::{DictReader, Reader};
pub use schema::Schema;
pub use types::TypeTag;
pub use value::Value;
pub use write::{DictWriter, Writer};

use std::io;
use std::path::Path;

/// Parses a complete ROW text into name-keyed records.
///
/// # Examples
///
/// ```rust
/// use row_format::{parse, Error};
///
/// let rows = parse("x\nbool\n# no records yet\n").unwrap();
/// assert!(rows.is_empty());
///
/// let err = parse("x\n# no type line\n").unwrap_err();
/// assert!(matches!(err, Error::MalformedSchema(_)));
/// ```
///
/// # Errors
///
/// Returns [`Error::MalformedSchema`] if the header or type line is missing
/// or invalid, before any record is converted. Any record error aborts the
/// whole parse.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Vec<RowMap>> {
    parse_reader(text.as_bytes())
}

/// Parses ROW bytes into name-keyed records; gzip input is accepted.
///
/// # Errors
///
/// See [`parse`]. Invalid UTF-8 is reported as [`Error::Encoding`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_slice(bytes: &[u8]) -> Result<Vec<RowMap>> {
    parse_reader(bytes)
}

/// Reads a whole ROW stream into name-keyed records.
///
/// # Errors
///
/// See [`parse`]; read failures are reported as [`Error::Io`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_reader<R: io::Read>(reader: R) -> Result<Vec<RowMap>> {
    DictReader::new(reader)?.collect()
}

/// Reads a whole ROW file into name-keyed records; gzip files are accepted.
///
/// # Errors
///
/// See [`parse_reader`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<RowMap>> {
    DictReader::from_path(path)?.collect()
}

/// Serializes a schema and positional records to a ROW string.
///
/// # Examples
///
/// ```rust
/// use row_format::{row, to_string, TypeTag};
///
/// let text = to_string(["n"], [TypeTag::Int], &[row![1], row![null]]).unwrap();
/// assert_eq!(text, "n\nint\n1\n\\N\n");
/// ```
///
/// # Errors
///
/// Returns the first error [`Writer::write_row`] reports.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<N, T>(names: N, types: T, rows: &[Vec<Value>]) -> Result<String>
where
    N: IntoIterator,
    N::Item: Into<String>,
    T: IntoIterator<Item = TypeTag>,
{
    let mut buffer = Vec::new();
    to_writer(&mut buffer, names, types, rows)?;
    String::from_utf8(buffer).map_err(|e| Error::encoding(0, e))
}

/// Serializes a schema and positional records to a writer.
///
/// # Errors
///
/// Returns the first error [`Writer::write_row`] reports, or [`Error::Io`]
/// on the final flush.
pub fn to_writer<W, N, T>(sink: W, names: N, types: T, rows: &[Vec<Value>]) -> Result<()>
where
    W: io::Write,
    N: IntoIterator,
    N::Item: Into<String>,
    T: IntoIterator<Item = TypeTag>,
{
    let mut writer = Writer::new(sink, names, types)?;
    for row in rows {
        writer.write_row(row)?;
    }
    writer.close()
}
