//! Programmatic scroll-to-top
//!
//! A smooth scroll is started on the host and then polled once per animation
//! frame until the root is within [`TOP_EPSILON_PX`] of the top or
//! [`SCROLL_TIMEOUT_MS`] has passed. Whichever happens first resolves the
//! completion; the other never fires.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::oneshot;

/// Distance from the top that counts as "reached"
pub const TOP_EPSILON_PX: f32 = 1.0;

/// Fallback timeout for the smooth scroll
pub const SCROLL_TIMEOUT_MS: f64 = 1000.0;

/// Delay between the refresh scroll resolving and the edge guard clearing
pub const SETTLE_DELAY_MS: f64 = 300.0;

/// Why a programmatic refresh did nothing
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSkip {
    #[error("pull-to-refresh is not enabled")]
    RefreshDisabled,

    #[error("a refresh is already in progress")]
    AlreadyRefreshing,

    #[error("already scrolling to top")]
    AlreadyScrollingToTop,
}

/// How a programmatic scroll ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Scroll position reached the top
    ReachedTop,
    /// Fallback timeout elapsed first
    TimedOut,
    /// The call was a no-op
    Skipped(RefreshSkip),
    /// The widget was disconnected before the scroll resolved
    Detached,
}

/// Completion signal returned by the scroll calls.
///
/// Await it from async code, or poll it with [`ScrollCompletion::try_outcome`]
/// from an event loop.
#[derive(Debug)]
pub struct ScrollCompletion {
    rx: oneshot::Receiver<ScrollOutcome>,
    outcome: Option<ScrollOutcome>,
}

impl ScrollCompletion {
    fn pending() -> (oneshot::Sender<ScrollOutcome>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx, outcome: None })
    }

    /// Completion that is already resolved
    pub fn resolved(outcome: ScrollOutcome) -> Self {
        let (_tx, rx) = oneshot::channel();
        Self {
            rx,
            outcome: Some(outcome),
        }
    }

    /// Outcome if resolved, without blocking
    pub fn try_outcome(&mut self) -> Option<ScrollOutcome> {
        if self.outcome.is_none() {
            match self.rx.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.outcome = Some(ScrollOutcome::Detached)
                }
            }
        }
        self.outcome
    }

    pub fn is_resolved(&mut self) -> bool {
        self.try_outcome().is_some()
    }
}

impl Future for ScrollCompletion {
    type Output = ScrollOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.outcome {
            return Poll::Ready(outcome);
        }
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(result) => {
                let outcome = result.unwrap_or(ScrollOutcome::Detached);
                self.outcome = Some(outcome);
                Poll::Ready(outcome)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// What started the scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPurpose {
    /// `scroll_to_top`
    Plain,
    /// `scroll_to_top_and_refresh`; holds the edge guard
    Refresh,
}

/// One in-flight programmatic scroll
#[derive(Debug)]
pub struct ScrollToTopTask {
    purpose: ScrollPurpose,
    started_ms: f64,
    sender: Option<oneshot::Sender<ScrollOutcome>>,
}

impl ScrollToTopTask {
    pub fn start(purpose: ScrollPurpose, now_ms: f64) -> (Self, ScrollCompletion) {
        let (tx, completion) = ScrollCompletion::pending();
        let task = Self {
            purpose,
            started_ms: now_ms,
            sender: Some(tx),
        };
        (task, completion)
    }

    /// Check the scroll position on an animation frame. Returns the outcome
    /// on the frame that resolves the task, `None` before and after.
    pub fn poll(&mut self, scroll_top: f32, now_ms: f64) -> Option<ScrollOutcome> {
        if self.sender.is_none() {
            return None;
        }
        let outcome = if scroll_top <= TOP_EPSILON_PX {
            ScrollOutcome::ReachedTop
        } else if now_ms - self.started_ms >= SCROLL_TIMEOUT_MS {
            ScrollOutcome::TimedOut
        } else {
            return None;
        };
        self.resolve(outcome);
        Some(outcome)
    }

    /// Resolve as detached (widget torn down)
    pub fn detach(&mut self) {
        self.resolve(ScrollOutcome::Detached);
    }

    fn resolve(&mut self, outcome: ScrollOutcome) {
        if let Some(tx) = self.sender.take() {
            tracing::debug!("scroll to top ({:?}) resolved: {:?}", self.purpose, outcome);
            // Receiver may already be dropped
            let _ = tx.send(outcome);
        }
    }

    pub fn purpose(&self) -> ScrollPurpose {
        self.purpose
    }

    pub fn is_resolved(&self) -> bool {
        self.sender.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_at_epsilon() {
        let (mut task, mut completion) = ScrollToTopTask::start(ScrollPurpose::Plain, 0.0);
        assert_eq!(task.poll(300.0, 16.0), None);
        assert_eq!(completion.try_outcome(), None);

        assert_eq!(task.poll(1.0, 32.0), Some(ScrollOutcome::ReachedTop));
        assert!(task.is_resolved());
        assert_eq!(completion.try_outcome(), Some(ScrollOutcome::ReachedTop));
        // Cached after the first read
        assert_eq!(completion.try_outcome(), Some(ScrollOutcome::ReachedTop));
    }

    #[test]
    fn test_times_out_once() {
        let (mut task, mut completion) = ScrollToTopTask::start(ScrollPurpose::Refresh, 100.0);
        assert_eq!(task.poll(500.0, 1_099.0), None);
        assert_eq!(task.poll(500.0, 1_100.0), Some(ScrollOutcome::TimedOut));
        // Reaching the top afterwards does not resolve again
        assert_eq!(task.poll(0.0, 1_116.0), None);
        assert_eq!(completion.try_outcome(), Some(ScrollOutcome::TimedOut));
    }

    #[test]
    fn test_detach_and_dropped_task() {
        let (mut task, mut completion) = ScrollToTopTask::start(ScrollPurpose::Plain, 0.0);
        task.detach();
        assert_eq!(completion.try_outcome(), Some(ScrollOutcome::Detached));

        let (task, mut completion) = ScrollToTopTask::start(ScrollPurpose::Plain, 0.0);
        drop(task);
        assert_eq!(completion.try_outcome(), Some(ScrollOutcome::Detached));
    }

    #[test]
    fn test_skip_messages() {
        let completion = ScrollCompletion::resolved(ScrollOutcome::Skipped(
            RefreshSkip::AlreadyRefreshing,
        ));
        assert_eq!(completion.outcome, Some(ScrollOutcome::Skipped(RefreshSkip::AlreadyRefreshing)));
        assert_eq!(
            RefreshSkip::RefreshDisabled.to_string(),
            "pull-to-refresh is not enabled"
        );
    }
}
