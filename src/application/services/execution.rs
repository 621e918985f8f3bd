//! Execution strategies for fetch completions.

use tokio::sync::mpsc;
use tracing::{error, trace};

use crate::domain::entities::DownloadOutcome;

/// Callback invoked exactly once with the outcome of a fetch.
pub type Completion = Box<dyn FnOnce(DownloadOutcome) + Send + 'static>;

/// How `fetch_image` schedules work and delivers its completion.
#[derive(Debug, Clone)]
pub enum ExecutionMode {
    /// Work runs on the tokio runtime; `fetch_image` returns immediately and
    /// the completion is posted to the main context behind `CompletionSender`.
    Background(CompletionSender),
    /// Work is awaited by the caller; the completion fires before
    /// `fetch_image` returns. Disk reads and decodes run on the calling task.
    Inline,
}

impl ExecutionMode {
    /// Returns true for the inline (test) regime.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline)
    }

    /// Returns true for the background (production) regime.
    #[must_use]
    pub const fn is_background(&self) -> bool {
        matches!(self, Self::Background(_))
    }
}

/// A finished fetch waiting for its completion to run on the main context.
struct PendingCompletion {
    path: String,
    outcome: DownloadOutcome,
    completion: Completion,
}

/// Posting side of the main-context completion queue.
#[derive(Clone)]
pub struct CompletionSender {
    tx: mpsc::UnboundedSender<PendingCompletion>,
}

impl std::fmt::Debug for CompletionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl CompletionSender {
    pub(crate) fn post(&self, path: String, outcome: DownloadOutcome, completion: Completion) {
        let pending = PendingCompletion {
            path,
            outcome,
            completion,
        };
        if let Err(e) = self.tx.send(pending) {
            error!(path = %e.0.path, "Main context is gone, dropping fetch completion");
        }
    }
}

/// Main-context side of the completion queue.
///
/// Whoever owns the queue is the main context: completions run on the task
/// that drains it.
pub struct CompletionQueue {
    rx: mpsc::UnboundedReceiver<PendingCompletion>,
}

impl CompletionQueue {
    /// Waits for the next completion and runs it.
    ///
    /// Returns false once every sender is gone and the queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(pending) => {
                Self::run(pending);
                true
            }
            None => false,
        }
    }

    /// Runs every completion that is already queued without waiting.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(pending) = self.rx.try_recv() {
            Self::run(pending);
            ran += 1;
        }
        ran
    }

    fn run(pending: PendingCompletion) {
        trace!(path = %pending.path, image = pending.outcome.is_image(), "Running fetch completion");
        (pending.completion)(pending.outcome);
    }
}

impl std::fmt::Debug for CompletionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionQueue").finish_non_exhaustive()
    }
}

/// Creates a connected completion sender and main-context queue.
#[must_use]
pub fn completion_channel() -> (CompletionSender, CompletionQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CompletionSender { tx }, CompletionQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FetchError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_completions_run_on_drain() {
        let (sender, mut queue) = completion_channel();
        let ran = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let ran = ran.clone();
            sender.post(
                "/a".to_string(),
                DownloadOutcome::Failure(FetchError::Cancelled),
                Box::new(move |_| {
                    ran.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert!(queue.run_next().await);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_queue_reports_closed() {
        let (sender, mut queue) = completion_channel();
        drop(sender);
        assert!(!queue.run_next().await);
    }

    #[test]
    fn test_mode_predicates() {
        let (sender, _queue) = completion_channel();
        assert!(ExecutionMode::Background(sender).is_background());
        assert!(ExecutionMode::Inline.is_inline());
    }
}
