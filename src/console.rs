//! Operator console: one command per stdin line, turned into workflow events
//! or simulated robot callbacks.

use std::io::BufRead;
use std::str::FromStr;

use anyhow::{Context, bail};
use courier_delivery::{
    BLOCKED_TOO_LONG, Event, MenuChoice, NavigationStatus, OBSTACLE_CODES, SettingField,
    SettingUpdate, Tray, UiEvent,
};
use courier_serial::command::{RESP_TRAY_BACK_BUTTON, RESP_TRAY_SENSOR};
use courier_serial::{BackButton, TraySensor, encode};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::sim::SimHardware;

pub const HELP: &str = "\
tray <t> | dest <name> | unbind <t> | go | pause | resume
pin <digits> | del | ok | menu <1|2|3|close> | settings | close-settings | calibrate
unload <t> | load <t> | back | obstacle | blocked | abort <code>
set <field> <value> | locations a, b, c | help | quit";

/// What the robot itself would report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotInput {
    /// Bytes from the tray board.
    Frame(Vec<u8>),
    /// Navigation status for the current target.
    Navigation(NavigationStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Queue(Vec<Event>),
    Robot(RobotInput),
    Help,
    Nothing,
    Quit,
}

fn ui(event: UiEvent) -> Command {
    Command::Queue(vec![Event::Ui(event)])
}

fn tray(arg: &str) -> anyhow::Result<Tray> {
    Tray::from_str(arg)
        .map_err(|_| anyhow::anyhow!("unknown tray {arg:?}, use top/middle/bottom or 0-2"))
}

fn sensor_frame(arg: &str, loaded: bool) -> anyhow::Result<Command> {
    let payload = TraySensor::new(tray(arg)?.index(), loaded).to_payload();
    let frame = encode(RESP_TRAY_SENSOR, &payload)?;
    Ok(Command::Robot(RobotInput::Frame(frame)))
}

pub fn parse_command(line: &str) -> anyhow::Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match (word, rest) {
        ("", _) => Command::Nothing,
        ("tray", t) => ui(UiEvent::SelectTray(tray(t)?)),
        ("dest", "") => bail!("dest needs a location name"),
        ("dest", name) => ui(UiEvent::SelectDestination(name.to_string())),
        ("unbind", t) => ui(UiEvent::UnbindTray(tray(t)?)),
        ("go", "") => ui(UiEvent::Go),
        ("pause", "") => ui(UiEvent::Pause),
        ("resume", "") => ui(UiEvent::PasswordDismiss),
        ("pin", digits) => {
            if digits.is_empty() {
                bail!("pin needs digits");
            }
            let events = digits
                .chars()
                .map(|c| {
                    c.to_digit(10)
                        .map(|d| Event::Ui(UiEvent::PasswordDigit(d as u8)))
                        .with_context(|| format!("{c:?} is not a digit"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            Command::Queue(events)
        }
        ("del", "") => ui(UiEvent::PasswordDelete),
        ("ok", "") => ui(UiEvent::PasswordConfirm),
        ("menu", "close") => ui(UiEvent::MenuDismiss),
        ("menu", n) => {
            let choice = n
                .parse::<u8>()
                .ok()
                .and_then(MenuChoice::from_number)
                .with_context(|| format!("menu option {n:?} is not 1, 2 or 3"))?;
            ui(UiEvent::AdminMenu(choice))
        }
        ("settings", "") => ui(UiEvent::OpenSettings),
        ("close-settings", "") => ui(UiEvent::CloseSettings),
        ("calibrate", "") => ui(UiEvent::CalibrateTrays),
        ("unload", t) => sensor_frame(t, false)?,
        ("load", t) => sensor_frame(t, true)?,
        ("back", "") => {
            let frame = encode(RESP_TRAY_BACK_BUTTON, &BackButton { event_code: 1 }.to_payload())?;
            Command::Robot(RobotInput::Frame(frame))
        }
        ("obstacle", "") => Command::Robot(RobotInput::Navigation(NavigationStatus::Obstacle(
            OBSTACLE_CODES[0],
        ))),
        ("blocked", "") => Command::Robot(RobotInput::Navigation(NavigationStatus::Abort(
            BLOCKED_TOO_LONG,
        ))),
        ("abort", code) => {
            let code = code
                .parse::<i32>()
                .with_context(|| format!("abort code {code:?} is not a number"))?;
            Command::Robot(RobotInput::Navigation(NavigationStatus::Abort(code)))
        }
        ("set", args) => {
            let (field, value) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
            let field = SettingField::from_str(field)
                .map_err(|_| anyhow::anyhow!("unknown setting {field:?}"))?;
            let update = SettingUpdate::parse(field, value.trim())?;
            Command::Queue(vec![Event::Settings(update)])
        }
        ("locations", list) => {
            let locations = list
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
            Command::Queue(vec![Event::Locations(locations)])
        }
        ("help", "") => Command::Help,
        ("quit", "") | ("exit", "") => Command::Quit,
        _ => bail!("unrecognised command {line:?}, try `help`"),
    };
    Ok(command)
}

/// Read stdin on its own thread; lines come out of the returned channel and
/// the channel closes at EOF.
pub fn spawn_stdin_reader() -> anyhow::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Turn console lines into events until `quit` or EOF, then ask for shutdown.
pub async fn console_task(
    mut lines: mpsc::Receiver<String>,
    tx: mpsc::Sender<Event>,
    hw: SimHardware,
) -> anyhow::Result<()> {
    info!("Console started. Type `help` for commands.");
    while let Some(line) = lines.recv().await {
        match parse_command(&line) {
            Ok(Command::Queue(events)) => {
                for event in events {
                    tx.send(event).await?;
                }
            }
            Ok(Command::Robot(RobotInput::Frame(frame))) => hw.receive_frame(frame).await,
            Ok(Command::Robot(RobotInput::Navigation(status))) => match hw.current_target() {
                Some(target) => hw.report(&target, status).await,
                None => warn!("robot has no navigation target"),
            },
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Nothing) => {}
            Ok(Command::Quit) => break,
            Err(e) => warn!(line = %line, "{e:#}"),
        }
    }
    info!("Console closed, shutting down.");
    tx.send(Event::Shutdown).await?;
    Ok(())
}
