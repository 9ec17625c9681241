//! Outcome returned from each steady-state iteration.

/// Public status of a single pass through the monitor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// Measurement shown; `posted` is true when a post succeeded this pass.
    Displayed { posted: bool },
    /// Post failed below the threshold; nothing shown this pass.
    PostFailed { streak: u32 },
    /// Post failed with the streak exhausted; the monitor is now offline.
    Downgraded,
}
