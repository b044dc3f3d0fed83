use std::time::Duration;

/// Parameters for the next attempt after a non-terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPlan {
    /// Close and reopen the connection before retrying.
    pub reopen: bool,
    /// Maximum number of bytes to request on the next read.
    pub chunk_size: usize,
    /// How long to wait before the next attempt.
    pub wait: Duration,
    /// Offset to retry at.
    pub offset: u64,
}

/// Outcome of [`RetryController::advance`](super::RetryController::advance).
///
/// `E` is the caller's failure type; on the terminal path it is handed back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<E> {
    /// Retry with the given parameters.
    Retry(RetryPlan),
    /// Escalation ladder exhausted: abandon the fetch with this failure.
    Abandon(E),
}

impl<E> Decision<E> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Decision::Abandon(_))
    }

    /// The retry plan, if this is not a terminal decision.
    pub fn plan(&self) -> Option<&RetryPlan> {
        match self {
            Decision::Retry(plan) => Some(plan),
            Decision::Abandon(_) => None,
        }
    }
}
