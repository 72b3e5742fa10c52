//! Rangestream produces HTTP response bodies from arbitrary streaming data
//! sources (a file on disk, a generated buffer, a network-backed blob)
//! while exposing the metadata an HTTP layer needs for standard response
//! semantics: a content type, a last-modified timestamp, an entity tag, and
//! byte-range support.
//!
//! The backing store is only ever accessed through the five operations of
//! the [`StreamSource`] trait (open, get-size, seek, read, close). A
//! [`StreamedResponse`] binds one source to one HTTP exchange; opening it
//! yields a [`StreamedBody`] that implements [`http_body::Body`] and pulls
//! chunks lazily until the requested byte range is exhausted, closing the
//! source exactly once on every exit path.
//!
//! Request parsing, header formatting, and the server loop itself are the
//! surrounding HTTP stack's job; this crate only provides the body and the
//! metadata to build headers from.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use rangestream::{BufferSource, RequestedRange, StreamedResponse};
//!
//! # fn main() -> rangestream::Result<()> {
//! let source = BufferSource::new(&b"hello world"[..]);
//! let response = StreamedResponse::new(
//!     source,
//!     "txt",
//!     RequestedRange::window(0, 5),
//!     Utc::now(),
//!     "\"v1\"",
//! );
//!
//! let mut body = response.open()?;
//! assert_eq!(body.total_size(), 11);
//! let chunk = body.pull_chunk()?.expect("the range is non-empty");
//! assert_eq!(&chunk[..], b"hello");
//! assert!(body.pull_chunk()?.is_none());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod body;
pub mod error;
pub mod range;
pub mod response;
pub mod source;

pub use body::StreamedBody;
pub use error::StreamError;
pub use range::{ClampedRange, RequestedRange};
pub use response::StreamedResponse;
pub use source::{BufferSource, FileSource, StreamSource};
pub use {bytes, http_body};

/// A type alias for a result that can return a [`StreamError`].
pub type Result<T> = std::result::Result<T, StreamError>;
