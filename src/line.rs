//! Line tokenizing.
//!
//! A line carries data unless it is blank or its first non-space character
//! is `#`. Data lines are split on TAB into wire tokens; consecutive tabs
//! produce empty tokens, never nulls.
//!
//! Comment detection only ever looks at whole raw lines. A `#` inside a field
//! is escaped by the writer, so it cannot start a line.
//!
//! ```rust
//! use row_format::line::{is_data_line, split_fields};
//!
//! assert!(is_data_line("1\t2"));
//! assert!(!is_data_line("   "));
//! assert!(!is_data_line("  # note"));
//! assert_eq!(split_fields("a\t\tb").collect::<Vec<_>>(), vec!["a", "", "b"]);
//! ```

use crate::{Error, Result};
use std::io::BufRead;
use tracing::trace;

/// Returns true if the line is neither blank nor a comment.
#[must_use]
pub fn is_data_line(line: &str) -> bool {
    let stripped = line.trim();
    !stripped.is_empty() && !stripped.starts_with('#')
}

/// Splits a data line into its wire tokens.
pub fn split_fields(line: &str) -> std::str::Split<'_, char> {
    line.split('\t')
}

/// Pulls data lines one at a time from a buffered source.
///
/// Blank and comment lines are consumed silently. Only the `\n` terminator is
/// removed; a `\r` before it belongs to the last field.
pub struct DataLines<R> {
    inner: R,
    buf: Vec<u8>,
    line: usize,
}

impl<R: BufRead> DataLines<R> {
    pub fn new(inner: R) -> Self {
        DataLines {
            inner,
            buf: Vec::new(),
            line: 0,
        }
    }

    /// 1-based number of the last line consumed, 0 before the first read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Returns the next data line, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on read failure and [`Error::Encoding`] if the
    /// line is not UTF-8.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            self.buf.clear();
            if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            if self.buf.last() == Some(&b'\n') {
                self.buf.pop();
            }
            let text =
                std::str::from_utf8(&self.buf).map_err(|e| Error::encoding(self.line, e))?;
            if is_data_line(text) {
                return Ok(Some(text.to_string()));
            }
            trace!(line = self.line, "skipping blank or comment line");
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_inside_line_is_data() {
        assert!(is_data_line("3\t6\t#7"));
        assert!(!is_data_line("#2\t5"));
        assert!(is_data_line("\\#a\tb"));
    }

    #[test]
    fn test_data_lines_skip() {
        let input = "# header comment\na\tb\n\n   \nint\tint\n#x\n1\t2";
        let mut lines = DataLines::new(input.as_bytes());
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("a\tb"));
        assert_eq!(lines.line_number(), 2);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("int\tint"));
        assert_eq!(lines.line_number(), 5);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("1\t2"));
        assert_eq!(lines.next_line().unwrap(), None);
        assert_eq!(lines.next_line().unwrap(), None);
    }

    #[test]
    fn test_carriage_return_kept() {
        let mut lines = DataLines::new(&b"x\r\n"[..]);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("x\r"));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut lines = DataLines::new(&b"ok\n\xff\xfe\n"[..]);
        assert!(lines.next_line().unwrap().is_some());
        assert!(matches!(
            lines.next_line(),
            Err(Error::Encoding { line: 2, .. })
        ));
    }
}
