use std::time::Duration;

/// Default nominal chunk size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;
/// Default chunk size floor (4 KiB).
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 4 * 1024;
/// Default wait before a retry.
pub const DEFAULT_INITIAL_WAIT: Duration = Duration::from_secs(1);
/// Default upper bound on the wait before a retry.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

/// Baseline parameters of a [`RetryController`](super::RetryController).
///
/// Build with [`RetrySettings::new`], which normalizes the bounds so the
/// controller can never be constructed in an inconsistent state:
/// the floor is at least one byte, the chunk size is at least the floor,
/// and the wait cap is at least the initial wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    chunk_size: usize,
    min_chunk_size: usize,
    initial_wait: Duration,
    max_wait: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self::new(
            DEFAULT_CHUNK_SIZE,
            DEFAULT_MIN_CHUNK_SIZE,
            DEFAULT_INITIAL_WAIT,
            DEFAULT_MAX_WAIT,
        )
    }
}

impl RetrySettings {
    pub fn new(
        chunk_size: usize,
        min_chunk_size: usize,
        initial_wait: Duration,
        max_wait: Duration,
    ) -> Self {
        let min_chunk_size = min_chunk_size.max(1);
        Self {
            chunk_size: chunk_size.max(min_chunk_size),
            min_chunk_size,
            initial_wait,
            max_wait: max_wait.max(initial_wait),
        }
    }

    /// Same settings with a different nominal chunk size (clamped to the floor).
    pub fn with_chunk_size(self, chunk_size: usize) -> Self {
        Self::new(chunk_size, self.min_chunk_size, self.initial_wait, self.max_wait)
    }

    /// Nominal (maximum) read size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Floor for chunk shrinking.
    pub fn min_chunk_size(&self) -> usize {
        self.min_chunk_size
    }

    pub fn initial_wait(&self) -> Duration {
        self.initial_wait
    }

    /// Cap for wait lengthening.
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }
}
