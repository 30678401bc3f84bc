//! Shutdown latch for the gateway.

use std::future::Future;

use tokio::sync::watch;

/// One-way latch flipped when the gateway should stop.
///
/// Waiters created after the trigger still observe it.
#[derive(Debug)]
pub struct Shutdown {
    fired: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (fired, _) = watch::channel(false);
        Self { fired }
    }

    /// Future that completes once [`Shutdown::trigger`] has been called.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.fired.subscribe();
        async move {
            // An error means the latch was dropped without firing; keep serving.
            if rx.wait_for(|fired| *fired).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Flip the latch. Repeated calls are no-ops.
    pub fn trigger(&self) {
        self.fired.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.fired.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
