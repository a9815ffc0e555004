//! Progress reporting and cooperative cancellation for pipeline stages.
//!
//! Every stage takes a [`RunContext`] instead of reaching for shared state.
//! A stage reports a percentage at each checkpoint and then learns whether
//! it should keep going.

use crate::error::ExpandError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag polled by pipeline stages at their checkpoints.
///
/// Clones share the same flag.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears the flag so the token can guard the next run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CancellationToken")
            .field(&self.is_cancelled())
            .finish()
    }
}

/// Receives progress percentages in `0..=100`.
pub trait Progress {
    fn report(&self, percentage: u8);
}

impl<F> Progress for F
where
    F: Fn(u8),
{
    fn report(&self, percentage: u8) {
        self(percentage)
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&self, _percentage: u8) {}
}

/// Capabilities threaded through one pipeline run.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    cancel: &'a CancellationToken,
    progress: &'a dyn Progress,
}

impl<'a> RunContext<'a> {
    pub fn new(cancel: &'a CancellationToken, progress: &'a dyn Progress) -> Self {
        Self { cancel, progress }
    }

    pub fn report(&self, percentage: u8) {
        self.progress.report(percentage.min(100));
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fails with [`ExpandError::Cancelled`] once cancellation was requested.
    pub fn check_cancelled(&self) -> Result<(), ExpandError> {
        if self.is_cancelled() {
            Err(ExpandError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Reports `percentage`, then checks for cancellation.
    pub fn checkpoint(&self, percentage: u8) -> Result<(), ExpandError> {
        self.report(percentage);
        self.check_cancelled()
    }
}

impl fmt::Debug for RunContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("cancel", self.cancel)
            .finish_non_exhaustive()
    }
}
