//! Configuration options for ROW readers and writers.
//!
//! ```rust
//! use row_format::RowOptions;
//!
//! let options = RowOptions::new()
//!     .with_detect_compression(false)
//!     .with_buffer_capacity(64 * 1024);
//! assert!(!options.detect_compression);
//! ```

/// Default size of the read and write buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Options shared by readers and writers.
///
/// Writers only use `buffer_capacity`; their output is always plain text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowOptions {
    /// Sniff the gzip magic bytes and decompress transparently on read.
    pub detect_compression: bool,
    pub buffer_capacity: usize,
}

impl Default for RowOptions {
    fn default() -> Self {
        RowOptions {
            detect_compression: true,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl RowOptions {
    /// Creates default options (compression detection on, 8 KiB buffers).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use row_format::RowOptions;
    ///
    /// let options = RowOptions::new();
    /// assert!(options.detect_compression);
    /// assert_eq!(options.buffer_capacity, 8 * 1024);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_detect_compression(mut self, detect: bool) -> Self {
        self.detect_compression = detect;
        self
    }

    /// Sets the buffer size; zero is raised to one byte.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }
}
