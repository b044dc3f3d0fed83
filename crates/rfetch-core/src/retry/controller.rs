use std::time::Duration;

use super::decision::{Decision, RetryPlan};
use super::settings::RetrySettings;
use super::strategy::Strategy;

/// Wait used when lengthening a zero wait (doubling zero would never grow).
const FIRST_LENGTHENED_WAIT: Duration = Duration::from_secs(1);

/// Per-fetch retry state and decision function.
///
/// One instance belongs to one in-flight fetch. Call [`reset`](Self::reset)
/// after every successful read and [`advance`](Self::advance) after every
/// failed one.
#[derive(Debug, Clone)]
pub struct RetryController {
    settings: RetrySettings,
    failed_at_same_position: bool,
    position: u64,
    strategy: Strategy,
    chunk_size: usize,
    wait: Duration,
}

impl RetryController {
    /// Controller at baseline, positioned at `start`.
    pub fn new(settings: RetrySettings, start: u64) -> Self {
        Self {
            settings,
            failed_at_same_position: false,
            position: start,
            strategy: Strategy::JustRetry,
            chunk_size: settings.chunk_size(),
            wait: settings.initial_wait(),
        }
    }

    /// Forget all escalation and re-baseline at `position`.
    ///
    /// Called after an attempt succeeds or after an out-of-band seek.
    pub fn reset(&mut self, position: u64) {
        self.position = position;
        self.failed_at_same_position = false;
        self.strategy = Strategy::JustRetry;
        self.chunk_size = self.settings.chunk_size();
        self.wait = self.settings.initial_wait();
    }

    /// Record a failed attempt that began at `offset` and decide what to do.
    ///
    /// Escalation needs two consecutive failures at the same offset; a failure
    /// at a different offset counts as progress and only moves the position.
    /// Once the ladder is exhausted every call is terminal until `reset`.
    pub fn advance<E>(&mut self, failure: E, offset: u64) -> Decision<E> {
        if self.strategy.is_exhausted() {
            return Decision::Abandon(failure);
        }

        if offset != self.position {
            tracing::debug!(
                from = self.position,
                to = offset,
                strategy = %self.strategy,
                "failure at new offset, not escalating"
            );
            self.position = offset;
            self.failed_at_same_position = false;
            return Decision::Retry(self.plan());
        }

        if !self.failed_at_same_position {
            self.failed_at_same_position = true;
            return Decision::Retry(self.plan());
        }

        self.escalate();
        if self.strategy.is_exhausted() {
            tracing::debug!(offset, "retry ladder exhausted");
            return Decision::Abandon(failure);
        }
        Decision::Retry(self.plan())
    }

    fn escalate(&mut self) {
        self.strategy = self.strategy.next();
        match self.strategy {
            Strategy::ShrinkChunk => {
                self.chunk_size = (self.chunk_size / 2).max(self.settings.min_chunk_size());
            }
            Strategy::LengthenWait => {
                let doubled = if self.wait.is_zero() {
                    FIRST_LENGTHENED_WAIT
                } else {
                    self.wait.saturating_mul(2)
                };
                self.wait = doubled.min(self.settings.max_wait()).max(self.wait);
            }
            Strategy::JustRetry | Strategy::Reopen | Strategy::Exhausted => {}
        }
        tracing::debug!(
            offset = self.position,
            strategy = %self.strategy,
            chunk_size = self.chunk_size,
            wait_ms = self.wait.as_millis() as u64,
            "escalated retry strategy"
        );
    }

    fn plan(&self) -> RetryPlan {
        RetryPlan {
            reopen: self.strategy == Strategy::Reopen,
            chunk_size: self.chunk_size,
            wait: self.wait,
            offset: self.position,
        }
    }

    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }

    /// Offset of the next attempt.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Chunk size to use on the next attempt.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Wait to observe before the next attempt.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn failed_at_same_position(&self) -> bool {
        self.failed_at_same_position
    }
}
