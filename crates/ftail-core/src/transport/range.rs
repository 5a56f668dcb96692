//! Byte range of newly appended data.

/// Half-open byte range `[start, end)` of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte to fetch (the tailer's current offset).
    pub start: u64,
    /// One past the last byte (the probed size).
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Length of this range in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value for curl's `range` option (inclusive end): `start-(end-1)`.
    pub fn curl_range(&self) -> String {
        if self.is_empty() {
            format!("{}-{}", self.start, self.start)
        } else {
            format!("{}-{}", self.start, self.end - 1)
        }
    }

    /// HTTP Range header value (inclusive end): `bytes=start-(end-1)`.
    pub fn header_value(&self) -> String {
        format!("bytes={}", self.curl_range())
    }
}
