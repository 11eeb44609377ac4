use std::sync::Arc;
use tokio::sync::broadcast;

use courier_delivery::DeliveryView;

/// Fan-out of snapshots to any number of readers. Slow readers lag and skip
/// ahead rather than holding up the publisher.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishing with nobody listening is fine.
    pub fn publish(&self, msg: T) {
        let _ = self.tx.send(Arc::new(msg));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

/// Workflow snapshots published after every dispatched event.
pub type ViewTopic = Topic<DeliveryView>;
