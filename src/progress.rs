use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{Error, Result};

/// Receives progress of a long-running build and may ask it to stop.
///
/// The builder calls [`Progress::begin`] once, then [`Progress::is_cancelled`]
/// once per split and [`Progress::advance`] for every step gained. Returning an
/// error from `advance` or `true` from `is_cancelled` aborts the build with
/// [`Error::Cancelled`].
pub trait Progress {
    fn begin(&mut self, _label: &str, _total_steps: usize) {}

    fn advance(&mut self) -> Result<()>;

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Ignores all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Shared flag another thread can raise to stop a build.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl Progress for CancelToken {
    fn advance(&mut self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Emits an `info` event for every step.
#[derive(Clone, Debug, Default)]
pub struct LogProgress {
    label: String,
    total: usize,
    current: usize,
}

impl LogProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }
}

impl Progress for LogProgress {
    fn begin(&mut self, label: &str, total_steps: usize) {
        self.label = label.to_string();
        self.total = total_steps;
        self.current = 0;
        tracing::info!(label, total_steps, "started");
    }

    fn advance(&mut self) -> Result<()> {
        self.current += 1;
        tracing::info!(label = %self.label, step = self.current, total = self.total, "progress");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CancelToken, LogProgress, Progress};
    use crate::error::Error;

    #[test]
    fn cancel_from_clone() {
        let mut progress = CancelToken::new();
        let handle = progress.clone();
        assert!(progress.advance().is_ok());
        assert!(!progress.is_cancelled());

        handle.cancel();
        assert!(progress.is_cancelled());
        assert_eq!(progress.advance(), Err(Error::Cancelled));
    }

    #[test]
    fn log_counts_steps() {
        let mut progress = LogProgress::new();
        progress.begin("Indexing", 3);
        for _ in 0..3 {
            progress.advance().expect("log progress never cancels");
        }
        assert_eq!(progress.current(), 3);
    }
}
