//! Positional reads from a local file.

use std::fs::File;
#[cfg(unix)]
use std::os::unix::fs::FileExt;

use super::{Connection, Transport, TransportError};
use crate::source::RemoteSource;

/// Opens local/opaque-path sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

#[derive(Debug)]
pub struct FileConnection {
    file: File,
}

impl Transport for FileTransport {
    type Conn = FileConnection;

    fn open(&self, source: &RemoteSource) -> Result<FileConnection, TransportError> {
        let path = source
            .path()
            .ok_or_else(|| TransportError::UnsupportedSource(source.label().to_string()))?;
        let file = File::open(path)?;
        Ok(FileConnection { file })
    }
}

impl Connection for FileConnection {
    #[cfg(unix)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(self.file.read_at(buf, offset)?)
    }

    /// Non-Unix fallback: seek + read on the owned handle.
    #[cfg(not(unix))]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, TransportError> {
        use std::io::{Read, Seek, SeekFrom};
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(self.file.read(buf)?)
    }

    fn content_length(&mut self) -> Result<Option<u64>, TransportError> {
        Ok(Some(self.file.metadata()?.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_past_end_return_zero() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"0123456789").unwrap();
        f.flush().unwrap();

        let mut conn = FileTransport.open(&RemoteSource::from_path(f.path())).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(conn.read_at(6, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"6789");
        assert_eq!(conn.read_at(10, &mut buf).unwrap(), 0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = RemoteSource::from_path(dir.path().join("absent"));
        let err = FileTransport.open(&source).unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[test]
    fn uri_source_is_rejected() {
        let source = RemoteSource::parse("https://example.com/x");
        let err = FileTransport.open(&source).unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedSource(_)));
    }
}
