//! A streaming source backed by a file on disk.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::source::StreamSource;

// Matches the cap the response body applies per pull, so a single read
// never allocates more than one chunk's worth of buffer.
const READ_BUF_SIZE: usize = 64 * 1024;

/// A [`StreamSource`] that serves a file from the local filesystem.
///
/// The file is opened lazily, when the response body is activated; size
/// comes from the file's metadata. For a response with content type,
/// last-modified, and etag derived from the same file, see
/// [`StreamedResponse::from_file`](crate::StreamedResponse::from_file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source serving the file at `path`.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The path this source serves.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StreamSource for FileSource {
    type Handle = File;

    fn open(&mut self) -> io::Result<File> {
        File::open(&self.path)
    }

    fn size(&mut self, handle: &mut File) -> io::Result<u64> {
        Ok(handle.metadata()?.len())
    }

    fn seek(&mut self, handle: &mut File, position: u64) -> io::Result<()> {
        handle.seek(SeekFrom::Start(position)).map(|_| ())
    }

    fn read(&mut self, handle: &mut File, max_len: usize) -> io::Result<Bytes> {
        let mut buf = vec![0; max_len.min(READ_BUF_SIZE)];
        let n = handle.read(&mut buf)?;
        buf.truncate(n);
        Ok(Bytes::from(buf))
    }

    fn close(&mut self, handle: File) {
        drop(handle);
    }
}
