//! Streaming ROW readers.
//!
//! A [`Reader`] takes any byte source, detects gzip compression from the
//! magic bytes, reads the schema from the first two data lines and then yields
//! one typed record per data line. It is an [`Iterator`] over
//! `Result<Vec<Value>>`, so records are produced lazily and in file order.
//!
//! [`DictReader`] is the same reader yielding [`RowMap`] records keyed by
//! field name.
//!
//! ## Usage
//!
//! ```rust
//! use row_format::{Reader, Value};
//!
//! let data = "a\tb\nint\ttext\n# a comment\n123\thi\n\\N\ta\\#b\\tc\n";
//! let mut reader = Reader::new(data.as_bytes()).unwrap();
//! assert_eq!(reader.field_names(), &["a".to_string(), "b".to_string()]);
//!
//! let first = reader.next().unwrap().unwrap();
//! assert_eq!(first, vec![Value::Integer(123), Value::from("hi")]);
//!
//! let second = reader.next().unwrap().unwrap();
//! assert_eq!(second, vec![Value::Null, Value::from("a#b\tc")]);
//!
//! assert!(reader.next().is_none());
//! assert!(reader.next().is_none());
//! ```

use crate::escape::unescape;
use crate::line::{split_fields, DataLines};
use crate::{Error, Result, RowMap, RowOptions, Schema, TypeTag, Value};
use flate2::read::MultiGzDecoder;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::iter::FusedIterator;
use std::path::Path;
use tracing::debug;

/// The two leading bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

type Prefixed<R> = io::Chain<Cursor<Vec<u8>>, R>;

/// A byte source with gzip compression resolved.
///
/// The bytes inspected while sniffing are replayed in front of the remaining
/// input, whichever branch is taken.
pub enum Source<R: Read> {
    Plain(BufReader<Prefixed<R>>),
    Gzip(BufReader<MultiGzDecoder<Prefixed<R>>>),
}

impl<R: Read> Source<R> {
    /// Wraps `inner`, decompressing if it starts with [`GZIP_MAGIC`] and
    /// detection is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the leading bytes cannot be read.
    pub fn open(mut inner: R, options: &RowOptions) -> Result<Self> {
        let mut magic = [0u8; 2];
        let peeked = if options.detect_compression {
            read_prefix(&mut inner, &mut magic)?
        } else {
            0
        };
        let prefixed = Cursor::new(magic[..peeked].to_vec()).chain(inner);
        // A zero-sized buffer would look like end of input
        let capacity = options.buffer_capacity.max(1);
        if peeked == GZIP_MAGIC.len() && magic == GZIP_MAGIC {
            debug!("gzip magic detected, decompressing input");
            let decoder = MultiGzDecoder::new(prefixed);
            Ok(Source::Gzip(BufReader::with_capacity(capacity, decoder)))
        } else {
            Ok(Source::Plain(BufReader::with_capacity(capacity, prefixed)))
        }
    }

    #[must_use]
    pub fn is_compressed(&self) -> bool {
        matches!(self, Source::Gzip(_))
    }
}

// Short reads are allowed, so keep reading until the buffer is full or EOF.
fn read_prefix<R: Read>(inner: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl<R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::Plain(r) => r.read(buf),
            Source::Gzip(r) => r.read(buf),
        }
    }
}

impl<R: Read> BufRead for Source<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Source::Plain(r) => r.fill_buf(),
            Source::Gzip(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Source::Plain(r) => r.consume(amt),
            Source::Gzip(r) => r.consume(amt),
        }
    }
}

/// A streaming reader yielding positional records.
pub struct Reader<R: Read> {
    lines: DataLines<Source<R>>,
    schema: Schema,
    compressed: bool,
    done: bool,
}

impl<R: Read> Reader<R> {
    /// Opens a reader with default options and reads the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSchema`] if the header or type line is
    /// missing or declares an unknown type, [`Error::Io`] on read failure.
    pub fn new(inner: R) -> Result<Self> {
        Self::with_options(inner, RowOptions::default())
    }

    /// Opens a reader with custom options and reads the schema.
    ///
    /// # Errors
    ///
    /// See [`Reader::new`].
    pub fn with_options(inner: R, options: RowOptions) -> Result<Self> {
        let source = Source::open(inner, &options)?;
        let compressed = source.is_compressed();
        let mut lines = DataLines::new(source);

        let header = lines
            .next_line()?
            .ok_or_else(|| Error::malformed_schema("missing header line"))?;
        let types = lines
            .next_line()?
            .ok_or_else(|| Error::malformed_schema("missing type line"))?;
        let schema = Schema::from_lines(&header, &types)?;
        debug!(
            fields = schema.len(),
            line = lines.line_number(),
            compressed,
            "schema read"
        );

        Ok(Reader {
            lines,
            schema,
            compressed,
            done: false,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn field_names(&self) -> &[String] {
        self.schema.field_names()
    }

    #[must_use]
    pub fn field_types(&self) -> &[TypeTag] {
        self.schema.field_types()
    }

    #[must_use]
    pub fn types_by_name(&self) -> IndexMap<String, TypeTag> {
        self.schema.types_by_name()
    }

    /// Whether the input was gzip-compressed.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// 1-based number of the last line consumed.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.lines.line_number()
    }

    /// Reads the next record, or `None` once the input is exhausted.
    ///
    /// After an error the reader reports exhaustion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowLength`] for a line with the wrong number of
    /// fields, [`Error::Conversion`] for a token invalid for its column type,
    /// [`Error::Io`] or [`Error::Encoding`] for source failures.
    pub fn read_record(&mut self) -> Result<Option<Vec<Value>>> {
        if self.done {
            return Ok(None);
        }
        let result = match self.lines.next_line() {
            Ok(Some(line)) => self.decode(&line).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    fn decode(&self, line: &str) -> Result<Vec<Value>> {
        let line_no = self.lines.line_number();
        let tokens: Vec<&str> = split_fields(line).collect();
        if tokens.len() != self.schema.len() {
            return Err(Error::RowLength {
                line: line_no,
                expected: self.schema.len(),
                found: tokens.len(),
            });
        }
        tokens
            .into_iter()
            .zip(self.schema.iter())
            .map(|(token, (name, tag))| {
                tag.parse(unescape(token).as_deref())
                    .map_err(|e| e.at_field(name).at_line(line_no))
            })
            .collect()
    }

    /// Converts this reader into one yielding name-keyed records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSchema`] if a field name is repeated.
    pub fn into_dict(self) -> Result<DictReader<R>> {
        DictReader::from_reader(self)
    }
}

impl Reader<File> {
    /// Opens the file at `path`; gzip files are decompressed transparently.
    ///
    /// # Errors
    ///
    /// See [`Reader::new`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Reader::new(File::open(path)?)
    }
}

impl<R: Read> Iterator for Reader<R> {
    type Item = Result<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

impl<R: Read> FusedIterator for Reader<R> {}

/// A streaming reader yielding records keyed by field name.
///
/// ```rust
/// use row_format::{DictReader, Value};
///
/// let data = "city\tinhabitants\ntext\tint\nNiterói\t487562\n";
/// let mut reader = DictReader::new(data.as_bytes()).unwrap();
/// let city = reader.next().unwrap().unwrap();
/// assert_eq!(city["inhabitants"], Value::Integer(487562));
/// ```
pub struct DictReader<R: Read> {
    reader: Reader<R>,
}

impl<R: Read> DictReader<R> {
    /// # Errors
    ///
    /// See [`Reader::new`]; repeated field names are also a
    /// [`Error::MalformedSchema`].
    pub fn new(inner: R) -> Result<Self> {
        Self::from_reader(Reader::new(inner)?)
    }

    /// # Errors
    ///
    /// See [`DictReader::new`].
    pub fn with_options(inner: R, options: RowOptions) -> Result<Self> {
        Self::from_reader(Reader::with_options(inner, options)?)
    }

    /// Wraps a positional reader whose schema has already been read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSchema`] if a field name is repeated.
    pub fn from_reader(reader: Reader<R>) -> Result<Self> {
        if let Some(name) = reader.schema().duplicate_name() {
            return Err(Error::malformed_schema(format!(
                "duplicate field name '{}'",
                name
            )));
        }
        Ok(DictReader { reader })
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        self.reader.schema()
    }

    #[must_use]
    pub fn field_names(&self) -> &[String] {
        self.reader.field_names()
    }

    #[must_use]
    pub fn field_types(&self) -> &[TypeTag] {
        self.reader.field_types()
    }

    #[must_use]
    pub fn types_by_name(&self) -> IndexMap<String, TypeTag> {
        self.reader.types_by_name()
    }

    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.reader.is_compressed()
    }

    #[must_use]
    pub fn line_number(&self) -> usize {
        self.reader.line_number()
    }

    /// Reads the next record, or `None` once the input is exhausted.
    ///
    /// # Errors
    ///
    /// See [`Reader::read_record`].
    pub fn read_record(&mut self) -> Result<Option<RowMap>> {
        let Some(values) = self.reader.read_record()? else {
            return Ok(None);
        };
        Ok(Some(
            self.reader
                .field_names()
                .iter()
                .cloned()
                .zip(values)
                .collect(),
        ))
    }

    /// Returns the positional reader this one wraps.
    pub fn into_reader(self) -> Reader<R> {
        self.reader
    }
}

impl DictReader<File> {
    /// # Errors
    ///
    /// See [`DictReader::new`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(Reader::from_path(path)?)
    }
}

impl<R: Read> Iterator for DictReader<R> {
    type Item = Result<RowMap>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

impl<R: Read> FusedIterator for DictReader<R> {}
