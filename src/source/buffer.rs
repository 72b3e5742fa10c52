//! A streaming source backed by an in-memory buffer.

use std::io::{self, Cursor, Seek, SeekFrom};

use bytes::Bytes;

use crate::source::StreamSource;

/// A [`StreamSource`] that serves a [`Bytes`] payload from memory.
///
/// Chunks are zero-copy slices of the shared buffer. Useful for small
/// payloads and as a test fixture for anything that consumes streamed
/// bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSource {
    data: Bytes,
}

impl BufferSource {
    /// Creates a source serving the given payload.
    #[must_use]
    pub fn new<T: Into<Bytes>>(data: T) -> Self {
        Self { data: data.into() }
    }
}

impl StreamSource for BufferSource {
    type Handle = Cursor<Bytes>;

    fn open(&mut self) -> io::Result<Cursor<Bytes>> {
        Ok(Cursor::new(self.data.clone()))
    }

    fn size(&mut self, handle: &mut Cursor<Bytes>) -> io::Result<u64> {
        Ok(handle.get_ref().len() as u64)
    }

    fn seek(&mut self, handle: &mut Cursor<Bytes>, position: u64) -> io::Result<()> {
        handle.seek(SeekFrom::Start(position)).map(|_| ())
    }

    fn read(&mut self, handle: &mut Cursor<Bytes>, max_len: usize) -> io::Result<Bytes> {
        let data = handle.get_ref();
        let start = usize::try_from(handle.position())
            .unwrap_or(usize::MAX)
            .min(data.len());
        let end = start.saturating_add(max_len).min(data.len());
        let chunk = data.slice(start..end);
        handle.set_position(end as u64);
        Ok(chunk)
    }

    fn close(&mut self, handle: Cursor<Bytes>) {
        drop(handle);
    }
}
