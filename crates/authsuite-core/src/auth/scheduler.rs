//! One-shot refresh timer.
//!
//! At most one refresh is pending at any time: arming always aborts the
//! previous timer before spawning the new one.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Default)]
pub struct RefreshTimer {
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl RefreshTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_fire` after `delay`, replacing any pending timer.
    ///
    /// `on_fire` runs in its own task so that re-arming from inside it
    /// does not abort it. Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        debug!(generation, delay_ms = delay.as_millis() as u64, "Arming refresh timer");

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(generation, "Refresh timer fired");
            tokio::spawn(on_fire);
        }));
    }

    /// Abort the pending timer. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_waiting = !handle.is_finished();
                handle.abort();
                was_waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Number of times the timer has been armed.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
