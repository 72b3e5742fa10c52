//! The streaming response body.
//!
//! A [`StreamedBody`] is the activated form of a
//! [`StreamedResponse`](crate::StreamedResponse): it owns the live source
//! handle and produces the clamped byte range as a lazy, finite,
//! forward-only sequence of chunks. The sequence can be consumed as an
//! [`http_body::Body`] by an HTTP stack, as a plain [`Iterator`] of
//! chunks, or as a [`Stream`] via
//! [`into_stream`](StreamedBody::into_stream). It is not restartable:
//! once exhausted or aborted, streaming again takes a new response and a
//! new open.

use std::fmt::{self, Debug, Formatter};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_core::Stream;
use http_body::{Frame, SizeHint};
use mime::Mime;
use tracing::{debug, warn};

use crate::Result;
use crate::error::StreamError;
use crate::range::ClampedRange;
use crate::source::StreamSource;

/// Largest number of bytes requested from the source in a single read.
///
/// Bounds per-chunk memory; the last chunk of a range is usually shorter.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024;

/// An opened response body streaming one clamped byte range from one
/// source.
///
/// The handle is owned exclusively by this value between open and close.
/// Close happens exactly once per body, on whichever comes first: the range
/// is exhausted, the source ends early, an operation fails, or the body is
/// dropped (client disconnect).
pub struct StreamedBody<S: StreamSource> {
    source: S,
    handle: Option<S::Handle>,
    content_type: Mime,
    last_modified: DateTime<Utc>,
    etag: String,
    total_size: u64,
    range: ClampedRange,
    cursor: u64,
    seeked: bool,
}

impl<S: StreamSource> StreamedBody<S> {
    pub(crate) fn new(
        source: S,
        handle: S::Handle,
        content_type: Mime,
        last_modified: DateTime<Utc>,
        etag: String,
        total_size: u64,
        range: ClampedRange,
    ) -> Self {
        Self {
            source,
            handle: Some(handle),
            content_type,
            last_modified,
            etag,
            total_size,
            range,
            cursor: range.offset(),
            seeked: false,
        }
    }

    /// The MIME type reported to the client.
    #[must_use]
    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    /// The timestamp for the `Last-Modified` header.
    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// The opaque validator for conditional requests.
    #[must_use]
    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// The full content length of the source, independent of the requested
    /// range.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// The byte range this body streams, clamped against
    /// [`total_size`](Self::total_size).
    ///
    /// This is what `Content-Length` and `Content-Range` should be computed
    /// from, keeping in mind that a source shorter than its declared size
    /// may legitimately deliver fewer bytes.
    #[must_use]
    pub fn range(&self) -> ClampedRange {
        self.range
    }

    /// Whether the source has been closed, because the range was exhausted,
    /// the stream failed, or [`close`](Self::close) was called.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_none()
    }

    /// Pulls the next chunk of the range.
    ///
    /// The first pull seeks the source to the range offset; every pull asks
    /// for at most the bytes remaining in the range (capped at
    /// [`MAX_CHUNK_SIZE`]). `Ok(None)` means the sequence has ended: either
    /// the full range was delivered or the source ended early, which is a
    /// normal short completion, not an error. After the sequence ends or
    /// fails, further pulls return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`StreamError::Seek`], [`StreamError::Read`], or
    /// [`StreamError::SourceOverrun`]; in every case the source has already
    /// been closed when the error is returned.
    pub fn pull_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.handle.is_none() {
            return Ok(None);
        }

        let remaining = self.range.end() - self.cursor;
        if remaining == 0 {
            self.close();
            return Ok(None);
        }

        if !self.seeked {
            self.seek_to_range_start()?;
        }

        let requested = remaining.min(MAX_CHUNK_SIZE as u64) as usize;
        let chunk = match self.read_chunk(requested) {
            Ok(chunk) => chunk,
            Err(source) => {
                self.close();
                return Err(StreamError::Read { source });
            }
        };

        if chunk.len() > requested {
            let returned = chunk.len();
            self.close();
            return Err(StreamError::SourceOverrun {
                requested,
                returned,
            });
        }
        if chunk.is_empty() {
            warn!(
                delivered = self.cursor - self.range.offset(),
                expected = self.range.length(),
                "source ended before the requested range was exhausted"
            );
            self.close();
            return Ok(None);
        }

        self.cursor += chunk.len() as u64;
        if self.cursor == self.range.end() {
            self.close();
        }
        Ok(Some(chunk))
    }

    /// Closes the source if it is still open.
    ///
    /// Called automatically when the range is exhausted, on any failure,
    /// and on drop; calling it again is a no-op. An aborting consumer
    /// (client disconnect, timeout) should stop pulling; dropping the body
    /// is enough.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.source.close(handle);
            debug!(cursor = self.cursor, "closed streaming source");
        }
    }

    /// Converts the body into a [`Stream`] of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> {
        futures_util::stream::iter(self)
    }

    fn seek_to_range_start(&mut self) -> Result<()> {
        self.seeked = true;
        let position = self.range.offset();
        // A forward-only source can only serve from byte zero; that was
        // checked at open time, so sequential order needs no seek at all.
        if !self.source.is_seekable() && position == 0 {
            return Ok(());
        }

        let result = match self.handle.as_mut() {
            Some(handle) => self.source.seek(handle, position),
            None => return Ok(()),
        };
        if let Err(source) = result {
            self.close();
            return Err(StreamError::Seek { position, source });
        }
        Ok(())
    }

    fn read_chunk(&mut self, max_len: usize) -> std::io::Result<Bytes> {
        match self.handle.as_mut() {
            Some(handle) => self.source.read(handle, max_len),
            None => Ok(Bytes::new()),
        }
    }
}

impl<S: StreamSource> Drop for StreamedBody<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: StreamSource> Debug for StreamedBody<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamedBody")
            .field("content_type", &self.content_type)
            .field("etag", &self.etag)
            .field("total_size", &self.total_size)
            .field("range", &self.range)
            .field("cursor", &self.cursor)
            .field("finished", &self.handle.is_none())
            .finish_non_exhaustive()
    }
}

impl<S: StreamSource> Iterator for StreamedBody<S> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull_chunk().transpose()
    }
}

impl<S> http_body::Body for StreamedBody<S>
where
    S: StreamSource + Unpin,
    S::Handle: Unpin,
{
    type Data = Bytes;
    type Error = StreamError;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<std::result::Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut().pull_chunk() {
            Ok(Some(chunk)) => Poll::Ready(Some(Ok(Frame::data(chunk)))),
            Ok(None) => Poll::Ready(None),
            Err(error) => Poll::Ready(Some(Err(error))),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.handle.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        if self.handle.is_none() {
            return SizeHint::with_exact(0);
        }
        // Upper bound only: a source shorter than its declared size ends
        // the body early without error.
        let mut hint = SizeHint::new();
        hint.set_upper(self.range.end() - self.cursor);
        hint
    }
}
