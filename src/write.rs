//! Streaming ROW writers.
//!
//! A [`Writer`] is created with a fixed schema, emits the header and type
//! lines immediately and then serializes one record per
//! [`write_row`](Writer::write_row) call. Each line is fully encoded before
//! anything reaches the sink, so a rejected record never leaves a partial
//! line behind.
//!
//! Output is always plain text; compression is only handled on read.
//!
//! ```rust
//! use row_format::{TypeTag, Value, Writer};
//!
//! let mut writer = Writer::new(Vec::new(), ["a", "b"], [TypeTag::Int, TypeTag::Text]).unwrap();
//! writer.write_row(&[Value::from(123), Value::from("hi")]).unwrap();
//! writer.write_row(&[Value::Null, Value::from("a#b\tc")]).unwrap();
//! let bytes = writer.into_inner().unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(bytes).unwrap(),
//!     "a\tb\nint\ttext\n123\thi\n\\N\ta\\#b\\tc\n"
//! );
//! ```

use crate::escape::escape;
use crate::line::is_data_line;
use crate::schema::join_line;
use crate::{Error, Result, RowMap, RowOptions, Schema, TypeTag, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// A streaming writer taking positional records.
pub struct Writer<W: Write> {
    sink: Option<BufWriter<W>>,
    schema: Schema,
    rows: usize,
}

impl<W: Write> Writer<W> {
    /// Creates a writer and emits the header and type lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if `names` and `types` differ in
    /// length, [`Error::Io`] if the header cannot be written.
    pub fn new<N, T>(sink: W, names: N, types: T) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator<Item = TypeTag>,
    {
        Self::from_schema(sink, Schema::new(names, types)?, RowOptions::default())
    }

    /// # Errors
    ///
    /// See [`Writer::new`].
    pub fn with_options<N, T>(sink: W, names: N, types: T, options: RowOptions) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator<Item = TypeTag>,
    {
        Self::from_schema(sink, Schema::new(names, types)?, options)
    }

    /// Creates a writer for an already validated schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the header cannot be written.
    pub fn from_schema(sink: W, schema: Schema, options: RowOptions) -> Result<Self> {
        let mut sink = BufWriter::with_capacity(options.buffer_capacity.max(1), sink);
        sink.write_all(schema.header_line().as_bytes())?;
        sink.write_all(schema.type_line().as_bytes())?;
        debug!(fields = schema.len(), "schema written");
        Ok(Writer {
            sink: Some(sink),
            schema,
            rows: 0,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of records written so far.
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Serializes one record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArityMismatch`] if the record length differs from the
    /// schema, [`Error::Conversion`] if a value does not fit its column type
    /// or the whole record would encode as a blank line,
    /// [`Error::Closed`] after [`Writer::close`], [`Error::Io`] on write
    /// failure. Nothing is written when an error is returned before I/O.
    pub fn write_row(&mut self, values: &[Value]) -> Result<()> {
        self.write_values(values.iter())
    }

    pub(crate) fn write_values<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: ExactSizeIterator<Item = &'a Value>,
    {
        let sink = self.sink.as_mut().ok_or(Error::Closed)?;
        if values.len() != self.schema.len() {
            return Err(Error::arity(self.schema.len(), values.len()));
        }
        let texts = values
            .zip(self.schema.iter())
            .map(|(value, (name, tag))| tag.serialize(value).map_err(|e| e.at_field(name)))
            .collect::<Result<Vec<_>>>()?;
        let line = join_line(texts.iter().map(|t| escape(t.as_deref())));
        // Readers skip whitespace-only lines, so such a record would vanish
        if !is_data_line(&line) {
            let found = line.trim_end_matches('\n');
            let tag = self.schema.field_types()[0].as_str();
            return Err(
                Error::conversion(tag, found, "record would be written as a blank line")
                    .at_field(&self.schema.field_names()[0]),
            );
        }
        sink.write_all(line.as_bytes())?;
        self.rows += 1;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::Closed`] after close, [`Error::Io`] on failure.
    pub fn flush(&mut self) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(Error::Closed)?;
        sink.flush()?;
        Ok(())
    }

    /// Flushes and releases the sink. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the final flush fails; the sink is released
    /// regardless.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(());
        };
        debug!(rows = self.rows, "closing writer");
        sink.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the writer was closed, [`Error::Io`] if
    /// the flush fails.
    pub fn into_inner(mut self) -> Result<W> {
        let sink = self.sink.take().ok_or(Error::Closed)?;
        sink.into_inner().map_err(|e| Error::Io(e.into_error()))
    }
}

impl Writer<File> {
    /// Creates (or truncates) the file at `path` and writes the schema to it.
    ///
    /// # Errors
    ///
    /// See [`Writer::new`].
    pub fn create<P, N, T>(path: P, names: N, types: T) -> Result<Self>
    where
        P: AsRef<Path>,
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator<Item = TypeTag>,
    {
        let schema = Schema::new(names, types)?;
        Self::from_schema(File::create(path)?, schema, RowOptions::default())
    }
}

/// A streaming writer taking records keyed by field name.
///
/// ```rust
/// use row_format::{record, DictWriter, TypeTag};
///
/// let mut writer = DictWriter::new(Vec::new(), ["x", "y"], [TypeTag::Bool, TypeTag::Float]).unwrap();
/// writer.write_row(&record! { "y" => 1.5, "x" => true }).unwrap();
/// let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(text, "x\ty\nbool\tfloat\ntrue\t1.5\n");
/// ```
pub struct DictWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> DictWriter<W> {
    /// # Errors
    ///
    /// See [`Writer::new`]; repeated field names are also a
    /// [`Error::SchemaMismatch`].
    pub fn new<N, T>(sink: W, names: N, types: T) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator<Item = TypeTag>,
    {
        Self::from_schema(sink, Schema::new(names, types)?, RowOptions::default())
    }

    /// # Errors
    ///
    /// See [`DictWriter::new`].
    pub fn from_schema(sink: W, schema: Schema, options: RowOptions) -> Result<Self> {
        if let Some(name) = schema.duplicate_name() {
            return Err(Error::schema_mismatch(format!(
                "duplicate field name '{}'",
                name
            )));
        }
        Ok(DictWriter {
            writer: Writer::from_schema(sink, schema, options)?,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        self.writer.schema()
    }

    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.writer.rows_written()
    }

    /// Serializes one record; its keys must be exactly the schema's fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArityMismatch`] for a missing or unknown key, and
    /// anything [`Writer::write_row`] returns.
    pub fn write_row(&mut self, record: &RowMap) -> Result<()> {
        let schema = self.writer.schema();
        if let Some(extra) = record.keys().find(|k| schema.position(k).is_none()) {
            return Err(Error::unexpected_field(extra));
        }
        let values = schema
            .field_names()
            .iter()
            .map(|name| record.get(name).ok_or_else(|| Error::missing_field(name)))
            .collect::<Result<Vec<_>>>()?;
        self.writer.write_values(values.into_iter())
    }

    /// # Errors
    ///
    /// See [`Writer::flush`].
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }

    /// # Errors
    ///
    /// See [`Writer::close`].
    pub fn close(&mut self) -> Result<()> {
        self.writer.close()
    }

    /// # Errors
    ///
    /// See [`Writer::into_inner`].
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use std::io;

    fn output(writer: Writer<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    /// Fails every write.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed pipe"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed pipe"))
        }
    }

    #[test]
    fn test_header_only() {
        let writer = Writer::new(Vec::new(), ["a"], [TypeTag::Date]).unwrap();
        assert_eq!(output(writer), "a\ndate\n");
    }

    #[test]
    fn test_schema_mismatch() {
        let result = Writer::new(Vec::new(), ["a", "b"], [TypeTag::Int]);
        assert!(matches!(result, Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_arity_mismatch_writes_nothing() {
        let mut writer = Writer::new(Vec::new(), ["a", "b"], [TypeTag::Int, TypeTag::Int]).unwrap();
        let err = writer.write_row(&[Value::from(1)]).unwrap_err();
        assert!(matches!(err, Error::ArityMismatch(_)));
        let err = writer
            .write_row(&[Value::from(1), Value::from(2), Value::from(3)])
            .unwrap_err();
        assert!(matches!(err, Error::ArityMismatch(_)));
        assert_eq!(writer.rows_written(), 0);
        assert_eq!(output(writer), "a\tb\nint\tint\n");
    }

    #[test]
    fn test_conversion_error_writes_nothing() {
        let mut writer = Writer::new(Vec::new(), ["a", "b"], [TypeTag::Int, TypeTag::Int]).unwrap();
        let err = writer
            .write_row(&[Value::from(1), Value::from("two")])
            .unwrap_err();
        match err {
            Error::Conversion { field, .. } => assert_eq!(field, "b"),
            other => panic!("expected conversion error, got {:?}", other),
        }
        assert_eq!(output(writer), "a\tb\nint\tint\n");
    }

    #[test]
    fn test_write_after_close() {
        let mut writer = Writer::new(Vec::new(), ["a"], [TypeTag::Text]).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(matches!(
            writer.write_row(&[Value::from("x")]),
            Err(Error::Closed)
        ));
        assert!(matches!(writer.into_inner(), Err(Error::Closed)));
    }

    #[test]
    fn test_io_failure_surfaces() {
        let options = RowOptions::new().with_buffer_capacity(1);
        let schema = Schema::new(["a"], [TypeTag::Int]).unwrap();
        let result = Writer::from_schema(Broken, schema, options);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_dict_writer_key_checks() {
        let mut writer =
            DictWriter::new(Vec::new(), ["a", "b"], [TypeTag::Int, TypeTag::Text]).unwrap();
        let missing = writer.write_row(&record! { "a" => 1 }).unwrap_err();
        assert!(missing.to_string().contains("'b'"));
        let extra = writer
            .write_row(&record! { "a" => 1, "b" => "x", "c" => 2 })
            .unwrap_err();
        assert!(extra.to_string().contains("'c'"));
        writer.write_row(&record! { "b" => "x", "a" => 1 }).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "a\tb\nint\ttext\n1\tx\n");
    }

    #[test]
    fn test_dict_writer_rejects_duplicates() {
        let result = DictWriter::new(Vec::new(), ["a", "a"], [TypeTag::Int, TypeTag::Int]);
        assert!(matches!(result, Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_blank_record_rejected() {
        let mut writer = Writer::new(Vec::new(), ["t"], [TypeTag::Text]).unwrap();
        for blank in ["", "  ", " \r"] {
            match writer.write_row(&[Value::from(blank)]) {
                Err(Error::Conversion { field, tag, .. }) => {
                    assert_eq!(field, "t");
                    assert_eq!(tag, "text");
                }
                other => panic!("expected conversion error, got {:?}", other),
            }
        }
        writer.write_row(&[Value::from("x")]).unwrap();
        writer.write_row(&[Value::Null]).unwrap();
        assert_eq!(writer.rows_written(), 2);
        assert_eq!(output(writer), "t\ntext\nx\n\\N\n");
    }

    #[test]
    fn test_blank_record_rejected_across_columns() {
        let mut writer = Writer::new(Vec::new(), ["a", "b"], [TypeTag::Text, TypeTag::Text]).unwrap();
        let err = writer.write_row(&[Value::from(""), Value::from(" ")]).unwrap_err();
        assert!(matches!(err, Error::Conversion { .. }));
        writer.write_row(&[Value::from(""), Value::from("y")]).unwrap();
        assert_eq!(output(writer), "a\tb\ntext\ttext\n\ty\n");
    }

    #[test]
    fn test_out_of_range_date_writes_nothing() {
        use chrono::NaiveDate;

        let mut writer = Writer::new(Vec::new(), ["d"], [TypeTag::Date]).unwrap();
        let far = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        match writer.write_row(&[Value::Date(far)]) {
            Err(Error::Conversion { field, .. }) => assert_eq!(field, "d"),
            other => panic!("expected conversion error, got {:?}", other),
        }
        assert_eq!(output(writer), "d\ndate\n");
    }

    #[test]
    fn test_zero_buffer_capacity() {
        let options = RowOptions {
            buffer_capacity: 0,
            ..RowOptions::default()
        };
        let schema = Schema::new(["n"], [TypeTag::Int]).unwrap();
        let mut writer = Writer::from_schema(Vec::new(), schema, options).unwrap();
        writer.write_row(&[Value::from(7)]).unwrap();
        assert_eq!(output(writer), "n\nint\n7\n");
    }
}
