//! Error types for streamed range responses.

use std::io;

use thiserror::Error;

/// An error that can occur while opening or streaming a ranged response
/// body.
///
/// Errors are local and terminal for the one response attempt that produced
/// them: the source is closed (where it was successfully opened) before the
/// error is returned, and a new [`StreamedResponse`](crate::StreamedResponse)
/// is needed to stream again.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    /// The source failed to produce a handle.
    ///
    /// No other source operation was invoked; cleanup of whatever the failed
    /// open allocated is the open implementation's own responsibility.
    #[error("could not open the streaming source: {source}")]
    Open {
        /// The underlying I/O error reported by the source.
        #[source]
        source: io::Error,
    },
    /// The source failed to report a total size after opening.
    ///
    /// Treated as an open-class failure: the just-opened handle is closed
    /// and the response is never produced.
    #[error("the streaming source did not report a valid size: {source}")]
    SizeUnavailable {
        /// The underlying I/O error reported by the source.
        #[source]
        source: io::Error,
    },
    /// Seeking to the start of the requested range failed.
    #[error("could not seek to byte {position} of the streaming source: {source}")]
    Seek {
        /// The absolute byte offset the seek targeted.
        position: u64,
        /// The underlying I/O error reported by the source.
        #[source]
        source: io::Error,
    },
    /// A range starting past byte zero was requested from a forward-only
    /// source.
    #[error(
        "the streaming source is forward-only and cannot serve a range starting at byte {position}"
    )]
    SeekUnsupported {
        /// The absolute byte offset the range starts at.
        position: u64,
    },
    /// Reading the next chunk from the source failed.
    #[error("could not read from the streaming source: {source}")]
    Read {
        /// The underlying I/O error reported by the source.
        #[source]
        source: io::Error,
    },
    /// The source returned a longer chunk than the adapter asked for.
    ///
    /// Delivering the extra bytes would push the body past the negotiated
    /// range and corrupt `Content-Length` framing, so the stream fails
    /// instead.
    #[error("the streaming source returned {returned} bytes where at most {requested} were requested")]
    SourceOverrun {
        /// How many bytes the adapter asked for.
        requested: usize,
        /// How many bytes the source actually returned.
        returned: usize,
    },
}

impl StreamError {
    /// Returns `true` for failures that occur before any body byte can have
    /// been produced.
    ///
    /// The HTTP layer can still map these to a clean error status; errors
    /// occurring mid-stream may arrive after headers were flushed, where the
    /// only remaining option is terminating the connection.
    #[must_use]
    pub fn is_open_failure(&self) -> bool {
        matches!(self, Self::Open { .. } | Self::SizeUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let error = StreamError::Seek {
            position: 4096,
            source: io::Error::other("device gone"),
        };

        assert_eq!(
            format!("{error}"),
            "could not seek to byte 4096 of the streaming source: device gone"
        );
    }

    #[test]
    fn display_source_overrun() {
        let error = StreamError::SourceOverrun {
            requested: 100,
            returned: 150,
        };

        assert_eq!(
            format!("{error}"),
            "the streaming source returned 150 bytes where at most 100 were requested"
        );
    }

    #[test]
    fn open_class_failures() {
        let open = StreamError::Open {
            source: io::Error::other("nope"),
        };
        let size = StreamError::SizeUnavailable {
            source: io::Error::other("nope"),
        };
        let read = StreamError::Read {
            source: io::Error::other("nope"),
        };

        assert!(open.is_open_failure());
        assert!(size.is_open_failure());
        assert!(!read.is_open_failure());
    }

    #[test]
    fn io_source_is_preserved() {
        let error = StreamError::Open {
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };

        assert!(std::error::Error::source(&error).is_some());
    }
}
