//! Byte-range representation and clamping.
//!
//! A [`RequestedRange`] is what the client asked for, before anything is
//! known about the backing source. It becomes a [`ClampedRange`] once the
//! source has been opened and its total size is known. Clamping cannot
//! happen earlier, since the size may depend on the opened resource.
//!
//! Parsing the `Range` header wire format is the HTTP layer's job; this
//! module only deals in resolved offsets and lengths.

/// A byte range requested by the client, or the "entire content" sentinel
/// when no range was requested.
///
/// # Examples
///
/// ```
/// use rangestream::RequestedRange;
///
/// let whole = RequestedRange::full();
/// let tail = RequestedRange::to_end(1024);
/// let window = RequestedRange::window(400, 200);
///
/// assert!(whole.is_full());
/// assert_eq!(tail.offset(), 1024);
/// assert_eq!(window.length(), Some(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestedRange {
    offset: u64,
    length: Option<u64>,
}

impl RequestedRange {
    /// The entire content, from byte zero to the end.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            offset: 0,
            length: None,
        }
    }

    /// Everything from `offset` to the end of the content.
    #[must_use]
    pub const fn to_end(offset: u64) -> Self {
        Self {
            offset,
            length: None,
        }
    }

    /// Exactly `length` bytes starting at `offset`.
    #[must_use]
    pub const fn window(offset: u64, length: u64) -> Self {
        Self {
            offset,
            length: Some(length),
        }
    }

    /// The byte offset the range starts at.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// The requested length, or `None` for "to the end of the content".
    #[must_use]
    pub const fn length(&self) -> Option<u64> {
        self.length
    }

    /// Returns `true` if this is the "entire content" sentinel.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.offset == 0 && self.length.is_none()
    }

    /// Resolves this range against the total size of the opened source.
    ///
    /// An over-length or unbounded range is clamped to `[offset, total)`;
    /// a range starting at or past the end becomes an empty range at
    /// `total`. Clamping is pure and never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangestream::RequestedRange;
    ///
    /// let range = RequestedRange::window(400, 200).clamp(500);
    /// assert_eq!(range.offset(), 400);
    /// assert_eq!(range.length(), 100);
    /// ```
    #[must_use]
    pub fn clamp(self, total: u64) -> ClampedRange {
        let offset = self.offset.min(total);
        let available = total - offset;
        let length = self.length.map_or(available, |length| length.min(available));
        ClampedRange { offset, length }
    }
}

impl Default for RequestedRange {
    fn default() -> Self {
        Self::full()
    }
}

/// A byte range resolved against the total size of an opened source.
///
/// Guaranteed to satisfy `offset + length <= total` for the total it was
/// clamped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClampedRange {
    offset: u64,
    length: u64,
}

impl ClampedRange {
    /// The byte offset the range starts at.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// The number of bytes in the range.
    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    /// The first byte offset past the range.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// Returns `true` if the range contains no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}
