//! HTTP(S) and FTP range reads over libcurl.
//!
//! One connection is one curl easy handle; libcurl keeps the TCP/TLS session
//! alive between reads on the same handle. Reopening builds a new handle, so
//! the next read starts on a fresh connection.
//!
//! For FTP, libcurl reports the server's reply code (150, 226, ...) where HTTP
//! would have a status, and a failed transfer already surfaces as a curl
//! error, so only HTTP responses go through status mapping.

use std::fmt;
use std::time::Duration;

use super::{Connection, Transport, TransportError};
use crate::source::RemoteSource;

/// libcurl knobs applied to every handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Abort a read when throughput stays below this many bytes/sec ...
    pub low_speed_limit: u32,
    /// ... for this long.
    pub low_speed_time: Duration,
    /// Optional receive rate cap in bytes/sec.
    pub max_recv_speed: Option<u64>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            max_recv_speed: None,
        }
    }
}

/// Opens HTTP(S)/FTP sources.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    options: HttpOptions,
}

impl HttpTransport {
    pub fn new(options: HttpOptions) -> Self {
        Self { options }
    }

    fn new_handle(&self, url: &str) -> Result<curl::easy::Easy, TransportError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.low_speed_limit(self.options.low_speed_limit)?;
        easy.low_speed_time(self.options.low_speed_time)?;
        if let Some(speed) = self.options.max_recv_speed {
            easy.max_recv_speed(speed)?;
        }
        Ok(easy)
    }
}

impl Transport for HttpTransport {
    type Conn = HttpConnection;

    fn open(&self, source: &RemoteSource) -> Result<HttpConnection, TransportError> {
        let url = source
            .url()
            .ok_or_else(|| TransportError::UnsupportedSource(source.label().to_string()))?
            .clone();
        let easy = self.new_handle(url.as_str())?;
        Ok(HttpConnection {
            easy,
            ftp: url.scheme() == "ftp",
            url: url.into(),
            transport: self.clone(),
        })
    }
}

pub struct HttpConnection {
    easy: curl::easy::Easy,
    ftp: bool,
    url: String,
    transport: HttpTransport,
}

impl fmt::Debug for HttpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection")
            .field("url", &self.url)
            .field("ftp", &self.ftp)
            .finish()
    }
}

impl Connection for HttpConnection {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, TransportError> {
        if buf.is_empty() {
            return Ok(0);
        }
        // curl expects "start-end" (inclusive), not "bytes=start-end"
        let end = offset + buf.len() as u64 - 1;
        self.easy.range(&format!("{}-{}", offset, end))?;

        let mut received = 0usize;
        let mut overflow = false;
        let performed = {
            let mut transfer = self.easy.transfer();
            transfer.write_function(|data| {
                let n = data.len().min(buf.len() - received);
                buf[received..received + n].copy_from_slice(&data[..n]);
                received += n;
                if n < data.len() {
                    // Returning a short count makes libcurl stop the transfer.
                    overflow = true;
                }
                Ok(n)
            })?;
            transfer.perform()
        };

        match performed {
            Ok(()) => {}
            Err(e) if e.is_write_error() && overflow => {}
            Err(e) => return Err(e.into()),
        }

        if self.ftp {
            return Ok(received);
        }
        read_result(self.easy.response_code()?, offset, received)
    }

    /// HEAD on a separate handle so the range state of the read handle is untouched.
    fn content_length(&mut self) -> Result<Option<u64>, TransportError> {
        let mut easy = self.transport.new_handle(&self.url)?;
        easy.nobody(true)?;
        easy.perform()?;
        if !self.ftp {
            let code = easy.response_code()?;
            if !(200..300).contains(&code) {
                return Err(TransportError::Http(code));
            }
        }
        let len = easy.content_length_download()?;
        Ok((len >= 0.0).then_some(len as u64))
    }
}

/// Map the HTTP status of a finished range request to the read result.
fn read_result(code: u32, offset: u64, received: usize) -> Result<usize, TransportError> {
    match code {
        206 => Ok(received),
        200 if offset == 0 => Ok(received),
        200 => Err(TransportError::RangeIgnored { offset }),
        // Range starts at or past the end of the object.
        416 => Ok(0),
        code => Err(TransportError::Http(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_source_is_rejected() {
        let err = HttpTransport::default()
            .open(&RemoteSource::from_path("/tmp/x"))
            .unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedSource(_)));
    }

    #[test]
    fn empty_read_does_not_touch_network() {
        let source = RemoteSource::parse("http://127.0.0.1:9/never");
        let mut conn = HttpTransport::default().open(&source).unwrap();
        assert_eq!(conn.read_at(0, &mut []).unwrap(), 0);
    }

    #[test]
    fn ftp_urls_open_in_ftp_mode() {
        let ftp = HttpTransport::default()
            .open(&RemoteSource::parse("ftp://127.0.0.1:9/pub/obj.bin"))
            .unwrap();
        assert!(ftp.ftp);
        let http = HttpTransport::default()
            .open(&RemoteSource::parse("http://127.0.0.1:9/obj.bin"))
            .unwrap();
        assert!(!http.ftp);
    }

    #[test]
    fn http_statuses_map_to_read_results() {
        assert_eq!(read_result(206, 4096, 100).unwrap(), 100);
        assert_eq!(read_result(200, 0, 100).unwrap(), 100);
        assert_eq!(read_result(416, 4096, 0).unwrap(), 0);
        assert!(matches!(
            read_result(200, 4096, 100),
            Err(TransportError::RangeIgnored { offset: 4096 })
        ));
        // FTP reply codes must never reach this mapping.
        assert!(matches!(read_result(226, 0, 100), Err(TransportError::Http(226))));
    }
}
