mod blackboard; // hardware mirror shared with the simulated robot
mod bus; // view snapshots fan-out
mod config; // config/default.toml + COURIER__ environment
mod console; // operator commands on stdin
mod runtime; // dispatch loop and view logger
mod scheduler; // tokio-backed timers
mod settings_feed; // live settings reload
mod sim; // simulated robot platform

use std::future::Future;
use std::sync::Arc;

use courier_delivery::{Coordinator, Event, Settings, SharedSettings};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

use blackboard::{Blackboard, snapshot};
use bus::ViewTopic;
use config::DEFAULT_CONFIG_PATH;
use scheduler::TokioScheduler;
use sim::{SimHardware, SimRobot};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Courier delivery runtime starting.");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let app = config::load_or_default(&path);
    let initial = app.settings.overlay(&Settings::default());

    let (tx, rx) = mpsc::channel(app.runtime.event_capacity.max(1));
    let bb: Blackboard = Arc::default();
    let hw = SimHardware::new(tx.clone(), bb.clone());
    let robot = SimRobot::new(hw.clone(), app.sim.clone());
    let coordinator = Coordinator::with_destination_policy(
        Box::new(robot),
        Box::new(TokioScheduler::new(tx.clone())),
        SharedSettings::new(initial.clone()),
        app.delivery.policy(),
    );

    let views = ViewTopic::new(16);
    tx.send(Event::Locations(app.sim.locations.clone())).await?;

    let lines = console::spawn_stdin_reader()?;
    let background = [
        supervise("console", console::console_task(lines, tx.clone(), hw)),
        supervise(
            "settings feed",
            settings_feed::settings_feed(path, app.runtime.settings_poll(), initial, tx.clone()),
        ),
        supervise("view logger", runtime::view_logger(views.subscribe())),
        supervise("ctrl-c", shutdown_on_ctrl_c(tx)),
    ];

    let result = runtime::dispatch_loop(coordinator, rx, views).await;
    for task in background {
        task.abort();
    }

    match result {
        Ok(_) => {
            let state = snapshot(&bb);
            info!(
                moving = state.moving,
                lit_trays = state.lit_trays(),
                lcd = %state.lcd_text,
                last_speech = ?state.last_speech,
                since_last_frame = ?state.last_frame_ts.elapsed(),
                faults = ?state.faults,
                "Courier delivery runtime stopped."
            );
            Ok(())
        }
        Err(e) => {
            error!("Dispatch loop failed: {:?}", e);
            Err(e)
        }
    }
}

/// Run a background task, logging how it ends.
fn supervise(
    name: &'static str,
    task: impl Future<Output = anyhow::Result<()>> + Send + 'static,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match task.await {
            Ok(()) => info!("{} task finished.", name),
            Err(e) => error!("{} task failed: {:?}", name, e),
        }
    })
}

async fn shutdown_on_ctrl_c(tx: mpsc::Sender<Event>) -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received.");
    tx.send(Event::Shutdown).await?;
    Ok(())
}
