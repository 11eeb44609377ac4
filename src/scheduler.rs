use std::collections::HashMap;
use std::time::Duration;

use courier_delivery::{Event, Scheduler, TimerKind, TimerTicket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Timers as sleeping tasks that push their ticket back into the event queue.
/// One task per kind; arming a kind again aborts the previous task.
pub struct TokioScheduler {
    tx: mpsc::Sender<Event>,
    tasks: HashMap<TimerKind, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        TokioScheduler {
            tx,
            tasks: HashMap::new(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, ticket: TimerTicket, after: Duration) {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if tx.send(Event::Timer(ticket)).await.is_err() {
                debug!(timer = ticket.kind.name(), "event queue closed before timer fired");
            }
        });
        if let Some(previous) = self.tasks.insert(ticket.kind, task) {
            previous.abort();
        }
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(task) = self.tasks.remove(&kind) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(kind: TimerKind, generation: u64) -> TimerTicket {
        TimerTicket { kind, generation }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticket_arrives_after_delay() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = TokioScheduler::new(tx);
        scheduler.schedule(ticket(TimerKind::UnloadGrace, 1), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            rx.recv().await,
            Some(Event::Timer(ticket(TimerKind::UnloadGrace, 1)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_task() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = TokioScheduler::new(tx);
        scheduler.schedule(ticket(TimerKind::ArriveCountdown, 1), Duration::from_secs(1));
        scheduler.schedule(ticket(TimerKind::ArriveCountdown, 2), Duration::from_secs(2));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(
            rx.recv().await,
            Some(Event::Timer(ticket(TimerKind::ArriveCountdown, 2)))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = TokioScheduler::new(tx);
        scheduler.schedule(ticket(TimerKind::AutoResume, 1), Duration::from_secs(1));
        scheduler.cancel(TimerKind::AutoResume);
        scheduler.cancel(TimerKind::AutoResume);
        scheduler.cancel(TimerKind::WrongTrayWarning);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_run_independently() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = TokioScheduler::new(tx);
        scheduler.schedule(ticket(TimerKind::ArriveCountdown, 1), Duration::from_secs(1));
        scheduler.schedule(ticket(TimerKind::WrongTrayWarning, 1), Duration::from_secs(2));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(
            rx.recv().await,
            Some(Event::Timer(ticket(TimerKind::ArriveCountdown, 1)))
        );
        assert_eq!(
            rx.recv().await,
            Some(Event::Timer(ticket(TimerKind::WrongTrayWarning, 1)))
        );
    }
}
