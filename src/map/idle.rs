//! One-shot "map has settled" notification.
//!
//! The widget hands out an [`IdleWait`] per request and resolves every
//! outstanding one the next time it reaches an idle frame.

use futures::channel::oneshot;

/// Resolves with `Ok(())` when the widget next reports idle, or with
/// `Err(Canceled)` if the widget goes away first.
pub type IdleWait = oneshot::Receiver<()>;

/// Widget-side registry of outstanding idle waits.
#[derive(Default)]
pub struct IdleListeners {
    pending: Vec<oneshot::Sender<()>>,
}

impl IdleListeners {
    pub fn once(&mut self) -> IdleWait {
        let (tx, rx) = oneshot::channel();
        self.pending.push(tx);
        rx
    }

    /// True if nobody is still waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.iter().all(|tx| tx.is_canceled())
    }

    /// Resolves and forgets every outstanding wait. Returns how many were
    /// still listening.
    pub fn fire(&mut self) -> usize {
        self.pending
            .drain(..)
            .filter_map(|tx| tx.send(()).ok())
            .count()
    }
}
