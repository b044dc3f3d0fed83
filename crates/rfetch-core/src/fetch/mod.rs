//! Fetch loop: read a remote object chunk by chunk into a `.part` file.
//!
//! The loop owns the connection and the destination writer. After every
//! successful read it resets the [`RetryController`]; after every transient
//! failure it asks the controller what to do and carries the answer out
//! (reopen, smaller chunk, wait). Permanent failures end the fetch at once.

mod error;
mod sleep;

pub use error::FetchError;
pub use sleep::{Sleeper, ThreadSleeper};

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::control::AbortToken;
use crate::retry::{Decision, RetryController, RetrySettings};
use crate::source::RemoteSource;
use crate::storage::{self, StorageWriter};
use crate::transport::{classify, Connection, Transport, TransportError};

/// Longest single sleep between abort checks.
const ABORT_POLL: Duration = Duration::from_millis(250);

/// What to fetch and where to put it.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub source: RemoteSource,
    /// Final path; data is staged in `<destination>.part`.
    pub destination: PathBuf,
    /// Object size if already known; otherwise asked from the transport.
    pub expected_size: Option<u64>,
    /// Continue from an existing `.part` file instead of starting over.
    pub resume: bool,
}

impl FetchRequest {
    pub fn new(source: RemoteSource, destination: impl Into<PathBuf>) -> Self {
        Self {
            source,
            destination: destination.into(),
            expected_size: None,
            resume: true,
        }
    }

    pub fn with_expected_size(mut self, size: u64) -> Self {
        self.expected_size = Some(size);
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}

/// Summary of a completed fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Size of the finished file.
    pub bytes_total: u64,
    /// Bytes read during this run (excludes resumed bytes).
    pub bytes_fetched: u64,
    /// Offset the run started at.
    pub resumed_from: u64,
    /// Failed attempts that were retried.
    pub retries: u32,
    /// Connections closed and reopened on the controller's instruction.
    pub reopens: u32,
}

/// Drives one fetch at a time; cheap to share per thread.
#[derive(Debug, Clone)]
pub struct Fetcher<T, S = ThreadSleeper> {
    transport: T,
    settings: RetrySettings,
    sleeper: S,
    abort: Option<AbortToken>,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, settings: RetrySettings) -> Self {
        Self {
            transport,
            settings,
            sleeper: ThreadSleeper,
            abort: None,
        }
    }
}

impl<T: Transport, S: Sleeper> Fetcher<T, S> {
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> Fetcher<T, S2> {
        Fetcher {
            transport: self.transport,
            settings: self.settings,
            sleeper,
            abort: self.abort,
        }
    }

    pub fn with_abort(mut self, token: AbortToken) -> Self {
        self.abort = Some(token);
        self
    }

    /// Fetch `request.source` into `request.destination`.
    pub fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome, FetchError> {
        let span = tracing::info_span!("fetch", source = %request.source);
        let _enter = span.enter();
        let started = Instant::now();
        self.check_abort()?;

        let mut conn: Option<T::Conn> = None;
        let size = match request.expected_size {
            Some(size) => Some(size),
            None => self.probe_size(&request.source, &mut conn),
        };

        let temp = storage::temp_path(&request.destination);
        let (writer, start) = prepare_storage(&temp, request.resume, size)?;

        let mut controller = RetryController::new(self.settings, start);
        let mut buf = vec![0u8; self.settings.chunk_size()];
        let mut position = start;
        let mut outcome = FetchOutcome {
            resumed_from: start,
            ..FetchOutcome::default()
        };
        // With no size to check against, an immediate end of stream at the
        // resume offset may mean the `.part` file runs past the object.
        let mut resume_unverified = start > 0 && size.is_none();
        tracing::info!(start, size = ?size, temp = %temp.display(), "fetch started");

        loop {
            self.check_abort()?;
            if size.is_some_and(|total| position >= total) {
                break;
            }
            let want = match size {
                Some(total) => (total - position).min(controller.chunk_size() as u64) as usize,
                None => controller.chunk_size(),
            };

            let failure = match self.read_chunk(&mut conn, &request.source, position, &mut buf[..want]) {
                Ok(0) if resume_unverified => {
                    tracing::warn!(
                        position,
                        "end of stream at resume offset with unknown size, starting over"
                    );
                    writer.truncate(0).map_err(FetchError::Storage)?;
                    position = 0;
                    outcome.resumed_from = 0;
                    controller.reset(0);
                    resume_unverified = false;
                    continue;
                }
                Ok(0) if size.is_none() => break,
                Ok(0) => TransportError::UnexpectedEof { offset: position },
                Ok(n) => {
                    resume_unverified = false;
                    writer
                        .write_at(position, &buf[..n])
                        .map_err(FetchError::Storage)?;
                    position += n as u64;
                    controller.reset(position);
                    continue;
                }
                Err(e) => e,
            };

            self.handle_failure(&mut controller, &mut conn, failure, position, &mut outcome)?;
        }

        if let Some(expected) = size {
            if position != expected {
                return Err(FetchError::SizeMismatch {
                    expected,
                    actual: position,
                });
            }
        }
        writer.sync().map_err(FetchError::Storage)?;
        writer
            .finalize(&request.destination)
            .map_err(FetchError::Storage)?;

        outcome.bytes_total = position;
        outcome.bytes_fetched = position - outcome.resumed_from;
        tracing::info!(
            bytes = outcome.bytes_total,
            fetched = outcome.bytes_fetched,
            retries = outcome.retries,
            reopens = outcome.reopens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetch completed"
        );
        Ok(outcome)
    }

    /// Open a connection early to learn the object size. Failures are not
    /// fatal: the main loop reopens and retries under the controller.
    fn probe_size(&self, source: &RemoteSource, conn: &mut Option<T::Conn>) -> Option<u64> {
        let probed = self.transport.open(source).and_then(|mut c| {
            let len = c.content_length()?;
            Ok((c, len))
        });
        match probed {
            Ok((c, len)) => {
                *conn = Some(c);
                len
            }
            Err(e) => {
                tracing::warn!(error = %e, "size probe failed; reading until end of stream");
                None
            }
        }
    }

    fn read_chunk(
        &self,
        conn: &mut Option<T::Conn>,
        source: &RemoteSource,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        let c = match conn {
            Some(c) => c,
            slot @ None => {
                tracing::debug!(offset, "opening connection");
                slot.insert(self.transport.open(source)?)
            }
        };
        c.read_at(offset, buf)
    }

    fn handle_failure(
        &self,
        controller: &mut RetryController,
        conn: &mut Option<T::Conn>,
        failure: TransportError,
        offset: u64,
        outcome: &mut FetchOutcome,
    ) -> Result<(), FetchError> {
        let kind = classify(&failure);
        if !kind.is_transient() {
            tracing::warn!(offset, error = %failure, "permanent failure");
            return Err(FetchError::Permanent {
                offset,
                source: failure,
            });
        }
        tracing::warn!(offset, kind = ?kind, error = %failure, "attempt failed");

        match controller.advance(failure, offset) {
            Decision::Abandon(source) => {
                tracing::warn!(offset, error = %source, "retries exhausted, abandoning fetch");
                Err(FetchError::Exhausted { offset, source })
            }
            Decision::Retry(plan) => {
                outcome.retries += 1;
                // Dropping the handle closes the connection; next read reopens.
                if plan.reopen && conn.take().is_some() {
                    outcome.reopens += 1;
                }
                tracing::debug!(
                    offset = plan.offset,
                    strategy = %controller.strategy(),
                    reopen = plan.reopen,
                    chunk_size = plan.chunk_size,
                    wait_ms = plan.wait.as_millis() as u64,
                    "retrying"
                );
                self.pause(plan.wait)
            }
        }
    }

    /// Sleep for `wait`, in slices so an abort is noticed promptly.
    fn pause(&self, wait: Duration) -> Result<(), FetchError> {
        let mut left = wait;
        while !left.is_zero() {
            self.check_abort()?;
            let step = left.min(ABORT_POLL);
            self.sleeper.sleep(step);
            left -= step;
        }
        Ok(())
    }

    fn check_abort(&self) -> Result<(), FetchError> {
        match &self.abort {
            Some(token) if token.is_aborted() => Err(FetchError::Aborted),
            _ => Ok(()),
        }
    }
}

/// Open or create the `.part` file and pick the start offset.
fn prepare_storage(
    temp: &Path,
    resume: bool,
    size: Option<u64>,
) -> Result<(StorageWriter, u64), FetchError> {
    if resume && temp.exists() {
        let writer = StorageWriter::open_existing(temp).map_err(FetchError::Storage)?;
        let existing = writer.len().map_err(FetchError::Storage)?;
        if size.is_some_and(|total| existing > total) {
            tracing::warn!(existing, size = ?size, "partial file larger than object, starting over");
            writer.truncate(0).map_err(FetchError::Storage)?;
            return Ok((writer, 0));
        }
        tracing::info!(existing, "resuming from partial file");
        return Ok((writer, existing));
    }
    let writer = StorageWriter::create(temp).map_err(FetchError::Storage)?;
    Ok((writer, 0))
}
