use thiserror::Error;

use crate::transport::TransportError;

/// Why a fetch stopped without producing the destination file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The retry ladder ran out; carries the last transport failure unchanged.
    #[error("giving up at offset {offset} after repeated failures: {source}")]
    Exhausted {
        offset: u64,
        #[source]
        source: TransportError,
    },
    /// A failure that retrying cannot fix (404, unsupported source, ...).
    #[error("permanent failure at offset {offset}: {source}")]
    Permanent {
        offset: u64,
        #[source]
        source: TransportError,
    },
    /// Destination file could not be written.
    #[error("storage: {0:#}")]
    Storage(anyhow::Error),
    /// Stopped through the abort token; the `.part` file is kept.
    #[error("fetch aborted")]
    Aborted,
    /// Finished reading but the byte count disagrees with the expected size.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
}
