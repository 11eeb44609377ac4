use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use courier_serial::Rgb;

/// What the simulated hardware currently shows and does.
#[derive(Clone)]
pub struct State {
    pub tray_lights: [Rgb; 3],
    pub lcd_text: String,
    pub target: Option<String>,
    pub moving: bool,
    pub ambience: bool,
    pub listeners: bool,
    pub last_speech: Option<String>,
    pub last_frame_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            tray_lights: [Rgb::OFF; 3],
            lcd_text: String::new(),
            target: None,
            moving: false,
            ambience: false,
            listeners: false,
            last_speech: None,
            last_frame_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

impl State {
    pub fn lit_trays(&self) -> usize {
        self.tray_lights.iter().filter(|c| !c.is_off()).count()
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn touch_frame(bb: &Blackboard) {
    bb.write().last_frame_ts = Instant::now();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faults_are_deduplicated() {
        let bb: Blackboard = Arc::default();
        raise_fault(&bb, "ambience track missing");
        raise_fault(&bb, "ambience track missing");
        raise_fault(&bb, "bad frame");
        assert_eq!(snapshot(&bb).faults.len(), 2);
    }

    #[test]
    fn test_tray_lights_start_off() {
        let bb: Blackboard = Arc::default();
        assert_eq!(snapshot(&bb).lit_trays(), 0);
        bb.write().tray_lights[2] = Rgb::BOUND;
        assert_eq!(snapshot(&bb).lit_trays(), 1);
    }
}
