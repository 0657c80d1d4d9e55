// ── Reactive state streams ──
//
// Subscription handle for consuming a component's state changes.

use tokio::sync::watch;

/// A subscription to one component's state.
pub struct StateStream<S: Clone + Send + Sync + 'static> {
    receiver: watch::Receiver<S>,
}

impl<S: Clone + Send + Sync + 'static> StateStream<S> {
    pub(crate) fn new(receiver: watch::Receiver<S>) -> Self {
        Self { receiver }
    }

    /// Wait until the state satisfies `pred` (checked against the latest
    /// value first). Returns `None` if the component is torn down first.
    pub async fn wait_until(&mut self, mut pred: impl FnMut(&S) -> bool) -> Option<S> {
        let snap = self.receiver.wait_for(|s| pred(s)).await.ok()?;
        Some(snap.clone())
    }
}
