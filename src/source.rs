//! The streaming source abstraction and the built-in sources.
//!
//! A streaming source is any backing store that can be accessed through
//! the five operations of [`StreamSource`] (open, get-size, seek, read,
//! close) and through nothing else. Two implementations ship with the crate:
//! [`FileSource`] for files on disk and [`BufferSource`] for in-memory
//! payloads; anything network-backed or generated on the fly can implement
//! the trait the same way.

use std::io;

use bytes::Bytes;

pub mod buffer;
pub mod file;

pub use buffer::BufferSource;
pub use file::FileSource;

/// A backing data store for a streamed response body.
///
/// The adapter drives one instance through a strictly sequential
/// `open` → `size` → `seek` → `read`×N → `close` lifecycle for a single HTTP
/// exchange; no two operations of one instance are ever invoked
/// concurrently. The operations may block; the surrounding server is
/// responsible for driving the body off whatever execution context serves
/// the connection.
///
/// The handle returned by [`open`](Self::open) is owned exclusively by the
/// response body until it is passed back to [`close`](Self::close), which is
/// invoked exactly once per successful open: on normal completion, on any
/// failure, and when the consumer drops the body early.
pub trait StreamSource {
    /// The live connection to the backing data, produced by
    /// [`open`](Self::open) and destroyed by [`close`](Self::close).
    type Handle;

    /// Opens the backing store and returns a handle to it.
    ///
    /// # Errors
    ///
    /// An error here means the response is never produced and no other
    /// operation (including `close`) will be invoked for it; an open that
    /// fails must release anything it had already acquired before
    /// returning.
    fn open(&mut self) -> io::Result<Self::Handle>;

    /// Reports the full content length of the backing store, independent of
    /// any requested range.
    ///
    /// Invoked exactly once, immediately after a successful open.
    ///
    /// # Errors
    ///
    /// An error is treated as an open-class failure: the handle is closed
    /// and the response is never produced.
    fn size(&mut self, handle: &mut Self::Handle) -> io::Result<u64>;

    /// Positions the store so the next read starts at `position` bytes from
    /// the beginning.
    ///
    /// Invoked at most once, before the first read. Not invoked at all for
    /// sources that report [`is_seekable`](Self::is_seekable) `false` (such
    /// sources only ever serve ranges starting at byte zero).
    ///
    /// # Errors
    ///
    /// An error aborts the response: the handle is closed and no read is
    /// ever issued.
    fn seek(&mut self, handle: &mut Self::Handle, position: u64) -> io::Result<()>;

    /// Reads up to `max_len` bytes from the current position.
    ///
    /// Returning an empty [`Bytes`] signals end-of-source; returning more
    /// than `max_len` bytes is a contract violation that fails the stream.
    /// The adapter never asks for more bytes than remain in the negotiated
    /// range.
    ///
    /// # Errors
    ///
    /// An error aborts the response and closes the handle.
    fn read(&mut self, handle: &mut Self::Handle, max_len: usize) -> io::Result<Bytes>;

    /// Releases the handle.
    ///
    /// Infallible by design: close runs on every exit path, including error
    /// paths that already carry a more interesting failure.
    fn close(&mut self, handle: Self::Handle);

    /// Whether this source supports seeking to an arbitrary offset.
    ///
    /// Forward-only sources return `false`; a range starting past byte zero
    /// then fails with
    /// [`SeekUnsupported`](crate::StreamError::SeekUnsupported) instead of
    /// silently mis-seeking.
    fn is_seekable(&self) -> bool {
        true
    }
}
