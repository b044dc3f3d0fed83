use std::fmt;

/// Rung of the escalation ladder, cheapest remedy first.
///
/// The variants are declared in ladder order, so the derived `Ord` matches
/// escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Strategy {
    /// Retry with the current connection and parameters.
    #[default]
    JustRetry,
    /// Close and reopen the connection before retrying.
    Reopen,
    /// Halve the chunk size (down to the floor).
    ShrinkChunk,
    /// Double the wait before the next attempt (up to the cap).
    LengthenWait,
    /// Ladder exhausted; the fetch must be abandoned.
    Exhausted,
}

impl Strategy {
    /// The next rung. `Exhausted` is absorbing.
    pub fn next(self) -> Strategy {
        match self {
            Strategy::JustRetry => Strategy::Reopen,
            Strategy::Reopen => Strategy::ShrinkChunk,
            Strategy::ShrinkChunk => Strategy::LengthenWait,
            Strategy::LengthenWait | Strategy::Exhausted => Strategy::Exhausted,
        }
    }

    pub fn is_exhausted(self) -> bool {
        self == Strategy::Exhausted
    }

    /// Short name used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::JustRetry => "just-retry",
            Strategy::Reopen => "reopen",
            Strategy::ShrinkChunk => "shrink-chunk",
            Strategy::LengthenWait => "lengthen-wait",
            Strategy::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
