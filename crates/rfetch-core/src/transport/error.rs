//! Transport failure type.

use thiserror::Error;

/// Failure of a single open or read attempt.
///
/// Kept as a concrete enum (not `anyhow`) so the fetch loop can classify it
/// and hand it to the retry controller before it is reported.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Server answered a range request at a non-zero offset with the full body.
    #[error("server ignored range request at offset {offset}")]
    RangeIgnored { offset: u64 },
    /// Local read failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Stream ended before the expected size was reached.
    #[error("unexpected end of stream at offset {offset}")]
    UnexpectedEof { offset: u64 },
    /// The transport cannot serve this kind of source.
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),
}
