use std::sync::Arc;

use courier_delivery::{Coordinator, DeliveryView, Event, PhaseKind};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bus::ViewTopic;

/// Drain the event queue into the coordinator, one event at a time, and
/// publish the resulting view. Returns after `Shutdown` or when every sender
/// is gone.
pub async fn dispatch_loop(
    mut coordinator: Coordinator,
    mut rx: mpsc::Receiver<Event>,
    views: ViewTopic,
) -> anyhow::Result<Coordinator> {
    info!("Dispatch loop started.");
    views.publish(coordinator.view());

    while let Some(event) = rx.recv().await {
        let shutdown = matches!(event, Event::Shutdown);
        coordinator.dispatch(event);
        views.publish(coordinator.view());
        if shutdown {
            info!("Shutdown requested.");
            return Ok(coordinator);
        }
    }

    info!("Event queue closed, releasing job resources.");
    coordinator.shutdown();
    views.publish(coordinator.view());
    Ok(coordinator)
}

/// Report phase changes and countdown progress from the view topic.
pub async fn view_logger(mut rx: broadcast::Receiver<Arc<DeliveryView>>) -> anyhow::Result<()> {
    info!("View logger started.");
    let mut last: Option<(PhaseKind, Option<String>, bool)> = None;

    loop {
        match rx.recv().await {
            Ok(view) => {
                let key = (view.phase, view.target.clone(), view.paused);
                if last.as_ref() != Some(&key) {
                    info!(phase = ?view.phase, "{}", view.summary());
                    last = Some(key);
                } else {
                    debug!("{}", view.summary());
                }
            }
            Err(RecvError::Lagged(n)) => {
                warn!(skipped = n, "View logger lagged behind.");
            }
            Err(RecvError::Closed) => {
                info!("View topic closed, logger stopping.");
                return Ok(());
            }
        }
    }
}
