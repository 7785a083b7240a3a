//! Fan-in barrier for a known number of concurrent units of work.
//!
//! A [`CompletionBarrier`] is created for `n` units and hands out `n`
//! [`BarrierReport`] tokens. Each token reports exactly once: explicitly via
//! [`BarrierReport::report`] or implicitly when dropped, so a unit that
//! panics or returns early still counts. [`CompletionBarrier::wait`] resolves
//! once the remaining count reaches zero; a barrier for zero units is complete
//! from the start.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tracing::trace;

struct Inner {
    remaining: AtomicUsize,
    done: Notify,
}

impl Inner {
    fn arrive(&self) {
        let prev = self.remaining.fetch_sub(1, Ordering::AcqRel);
        trace!(remaining = prev.saturating_sub(1), "barrier report");
        if prev == 1 {
            // notify_one stores a permit, so a waiter that registers late still wakes.
            self.done.notify_one();
        }
    }
}

pub struct CompletionBarrier {
    inner: Arc<Inner>,
    issued: usize,
    expected: usize,
}

impl CompletionBarrier {
    pub fn new(expected: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                remaining: AtomicUsize::new(expected),
                done: Notify::new(),
            }),
            issued: 0,
            expected,
        }
    }

    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::Acquire)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Hands out the next report token, or `None` once all `expected` tokens
    /// have been issued. Capping issuance keeps the count from underflowing.
    pub fn reporter(&mut self) -> Option<BarrierReport> {
        if self.issued == self.expected {
            return None;
        }
        self.issued += 1;
        Some(BarrierReport {
            inner: Some(Arc::clone(&self.inner)),
        })
    }

    /// Waits until every issued token, and every token still to be issued,
    /// has reported. Tokens that were never handed out are reported here, so
    /// a caller that dispatches fewer units than announced cannot hang.
    pub async fn wait(mut self) {
        while self.issued < self.expected {
            if let Some(report) = self.reporter() {
                report.report();
            }
        }
        while self.inner.remaining.load(Ordering::Acquire) != 0 {
            self.inner.done.notified().await;
        }
    }
}

/// Token owed to a [`CompletionBarrier`] by one unit of work.
pub struct BarrierReport {
    inner: Option<Arc<Inner>>,
}

impl BarrierReport {
    pub fn report(mut self) {
        if let Some(inner) = self.inner.take() {
            inner.arrive();
        }
    }
}

impl Drop for BarrierReport {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            inner.arrive();
        }
    }
}
