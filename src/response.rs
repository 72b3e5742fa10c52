//! The response type binding a streaming source to one HTTP exchange.

use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use mime::Mime;
use tracing::debug;

use crate::Result;
use crate::body::StreamedBody;
use crate::error::StreamError;
use crate::range::RequestedRange;
use crate::source::{FileSource, StreamSource};

/// A response body bound to one streaming source for the lifetime of a
/// single HTTP exchange.
///
/// The response carries the metadata the HTTP layer needs to generate
/// headers (content type, last-modified timestamp, entity tag) without
/// touching the source. The source is only opened when
/// [`open`](Self::open) is called, which should happen after header
/// negotiation (conditional requests, range validation) has determined the
/// response will actually stream a body.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use rangestream::{BufferSource, RequestedRange, StreamedResponse};
///
/// let response = StreamedResponse::new(
///     BufferSource::new(&b"<html></html>"[..]),
///     "html",
///     RequestedRange::full(),
///     Utc::now(),
///     "\"abc123\"",
/// );
/// assert_eq!(response.content_type().essence_str(), "text/html");
/// ```
#[derive(Debug)]
pub struct StreamedResponse<S> {
    source: S,
    content_type: Mime,
    last_modified: DateTime<Utc>,
    etag: String,
    range: RequestedRange,
}

impl<S: StreamSource> StreamedResponse<S> {
    /// Creates a response streaming `source` for the given byte range.
    ///
    /// `extension` is a file extension (without the leading dot) or similar
    /// logical name used only to infer the content type; unrecognized
    /// extensions fall back to `application/octet-stream`. The etag should
    /// be a non-empty opaque validator.
    #[must_use]
    pub fn new<E: Into<String>>(
        source: S,
        extension: &str,
        range: RequestedRange,
        last_modified: DateTime<Utc>,
        etag: E,
    ) -> Self {
        Self {
            source,
            content_type: mime_guess::from_ext(extension).first_or_octet_stream(),
            last_modified,
            etag: etag.into(),
            range,
        }
    }

    /// Overrides the inferred content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: Mime) -> Self {
        self.content_type = content_type;
        self
    }

    /// The MIME type reported to the client.
    #[must_use]
    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    /// The timestamp for the `Last-Modified` header and conditional-request
    /// validation.
    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// The opaque validator for conditional requests.
    #[must_use]
    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// The byte range the client asked for, not yet clamped.
    #[must_use]
    pub fn range(&self) -> RequestedRange {
        self.range
    }

    /// Opens the source and activates the body.
    ///
    /// Invokes `open`, queries the total size exactly once, clamps the
    /// requested range against it, and checks the seek capability for
    /// ranges starting past byte zero. On success the returned
    /// [`StreamedBody`] owns the live handle and carries the metadata plus
    /// the now-known total size and clamped range, so the HTTP layer can
    /// compute `Content-Length` and `Content-Range` before pulling the
    /// first chunk.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Open`] when the source fails to produce a
    /// handle (no other operation is invoked),
    /// [`StreamError::SizeUnavailable`] when the size query fails (the
    /// handle is closed first), and [`StreamError::SeekUnsupported`] when a
    /// forward-only source is asked for a range starting past byte zero
    /// (the handle is closed first).
    pub fn open(self) -> Result<StreamedBody<S>> {
        let Self {
            mut source,
            content_type,
            last_modified,
            etag,
            range,
        } = self;

        let mut handle = source.open().map_err(|source| StreamError::Open { source })?;
        let total_size = match source.size(&mut handle) {
            Ok(total_size) => total_size,
            Err(error) => {
                source.close(handle);
                return Err(StreamError::SizeUnavailable { source: error });
            }
        };

        let clamped = range.clamp(total_size);
        if !source.is_seekable() && clamped.offset() > 0 {
            source.close(handle);
            return Err(StreamError::SeekUnsupported {
                position: clamped.offset(),
            });
        }

        debug!(
            total_size,
            offset = clamped.offset(),
            length = clamped.length(),
            "opened streaming source"
        );
        Ok(StreamedBody::new(
            source,
            handle,
            content_type,
            last_modified,
            etag,
            total_size,
            clamped,
        ))
    }
}

impl StreamedResponse<FileSource> {
    /// Creates a response serving a file, with metadata derived from the
    /// file itself: content type from the path's extension, last-modified
    /// from the file's modification time, and an etag from the file's
    /// identity and modification time.
    ///
    /// The file is not held open: the path is re-opened when the body is
    /// activated, so a file replaced in between yields the new content
    /// (with the old validators; conditional-request handling is the HTTP
    /// layer's concern).
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Open`] when the file's metadata cannot be
    /// read.
    pub fn from_file<P: AsRef<Path>>(path: P, range: RequestedRange) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|source| StreamError::Open { source })?;
        let modified = metadata
            .modified()
            .map_err(|source| StreamError::Open { source })?;

        Ok(Self {
            source: FileSource::new(path),
            content_type: mime_guess::from_path(path).first_or_octet_stream(),
            last_modified: DateTime::<Utc>::from(modified),
            etag: file_etag(&metadata, modified),
            range,
        })
    }
}

// Identity + mtime, like classic filesystem etags: device and inode where
// the platform exposes them, content length elsewhere.
#[cfg(unix)]
fn file_etag(metadata: &Metadata, modified: SystemTime) -> String {
    use std::os::unix::fs::MetadataExt;

    let mtime = modified
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!(
        "\"{:x}:{:x}-{:x}.{:x}\"",
        metadata.dev(),
        metadata.ino(),
        mtime.as_secs(),
        mtime.subsec_micros()
    )
}

#[cfg(not(unix))]
fn file_etag(metadata: &Metadata, modified: SystemTime) -> String {
    let mtime = modified
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!(
        "\"{:x}-{:x}.{:x}\"",
        metadata.len(),
        mtime.as_secs(),
        mtime.subsec_micros()
    )
}
