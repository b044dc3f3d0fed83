//! Cancellation: a shared abort token checked by the fetch loop.
//!
//! The CLI hands one token to every running fetch and trips it on Ctrl-C.
//! The fetch loop checks it before each attempt and before sleeping, then
//! stops with [`FetchError::Aborted`](crate::fetch::FetchError::Aborted),
//! leaving the `.part` file in place for a later resume.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable abort flag; all clones share one state.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that every fetch holding this token stop.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
