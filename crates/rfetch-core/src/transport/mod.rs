//! Transports: open a connection to a remote object and read it at offsets.
//!
//! The fetch loop owns connections; reopening means dropping the current one
//! and calling [`Transport::open`] again. Dropping a connection closes it, so
//! closing is naturally idempotent.

mod classify;
mod error;
mod file;
mod http;

pub use classify::{classify, classify_curl_error, classify_http_status, classify_io_error, ErrorKind};
pub use error::TransportError;
pub use file::{FileConnection, FileTransport};
pub use http::{HttpConnection, HttpOptions, HttpTransport};

use crate::source::RemoteSource;

/// An open, readable handle to a remote object.
pub trait Connection {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read; fewer than requested is allowed and
    /// `0` means end of stream.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Total size of the object, if the transport can tell.
    fn content_length(&mut self) -> Result<Option<u64>, TransportError>;
}

/// Opens connections to remote objects.
pub trait Transport {
    type Conn: Connection;

    fn open(&self, source: &RemoteSource) -> Result<Self::Conn, TransportError>;
}

/// Transport that picks HTTP or local reads based on the source kind.
#[derive(Debug, Clone, Default)]
pub struct SourceTransport {
    http: HttpTransport,
    file: FileTransport,
}

impl SourceTransport {
    pub fn new(http_options: HttpOptions) -> Self {
        Self {
            http: HttpTransport::new(http_options),
            file: FileTransport,
        }
    }
}

/// Connection opened by [`SourceTransport`].
#[derive(Debug)]
pub enum SourceConnection {
    Http(HttpConnection),
    File(FileConnection),
}

impl Connection for SourceConnection {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self {
            SourceConnection::Http(c) => c.read_at(offset, buf),
            SourceConnection::File(c) => c.read_at(offset, buf),
        }
    }

    fn content_length(&mut self) -> Result<Option<u64>, TransportError> {
        match self {
            SourceConnection::Http(c) => c.content_length(),
            SourceConnection::File(c) => c.content_length(),
        }
    }
}

impl Transport for SourceTransport {
    type Conn = SourceConnection;

    fn open(&self, source: &RemoteSource) -> Result<SourceConnection, TransportError> {
        if source.is_uri() {
            self.http.open(source).map(SourceConnection::Http)
        } else {
            self.file.open(source).map(SourceConnection::File)
        }
    }
}
