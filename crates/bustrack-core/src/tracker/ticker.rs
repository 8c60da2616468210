// ── Tick task ownership ──

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns one spawned periodic task and cancels it when dropped.
///
/// The task receives its own `CancellationToken` and must exit
/// promptly once it is cancelled.
#[derive(Debug)]
pub struct TickerGuard {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TickerGuard {
    /// Spawn `task` on the current tokio runtime.
    pub fn spawn<F, Fut>(task: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(task(cancel.clone()));
        Self { cancel, handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
