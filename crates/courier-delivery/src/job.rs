//! Stops and the job that strings them together.
//!
//! A running job always holds at least one stop. When the last delivery is
//! consumed a return stop to the idle location is appended, so the robot
//! always finishes somewhere known.

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tray::Tray;

/// What a stop is for.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// Hand off the contents of the stop's tray.
    Delivery,
    /// Drive back to the idle location. The tray is a placeholder.
    Return,
}

/// One scheduled hand-off.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Destination name as known to the navigation platform.
    pub location: String,
    /// Tray to be emptied here.
    pub tray: Tray,
    /// Delivery or return leg.
    pub kind: StopKind,
}

impl Stop {
    /// A delivery of `tray` at `location`.
    pub fn delivery(location: impl Into<String>, tray: Tray) -> Self {
        Stop {
            location: location.into(),
            tray,
            kind: StopKind::Delivery,
        }
    }

    /// The synthetic wrap-up stop at the idle location (tray index 0 placeholder).
    pub fn home(idle_location: impl Into<String>) -> Self {
        Stop {
            location: idle_location.into(),
            tray: Tray::Top,
            kind: StopKind::Return,
        }
    }

    /// Whether this is the synthetic return stop.
    pub fn is_return(&self) -> bool {
        self.kind == StopKind::Return
    }
}

/// Ordered stops of one delivery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Job {
    stops: VecDeque<Stop>,
    completed: usize,
}

impl Job {
    /// Freeze a stop sequence into a job.
    pub fn from_stops(stops: impl IntoIterator<Item = Stop>) -> Self {
        Job {
            stops: stops.into_iter().collect(),
            completed: 0,
        }
    }

    /// Append a stop at the end.
    pub fn append(&mut self, stop: Stop) {
        self.stops.push_back(stop);
    }

    /// Pop the current stop, counting it as done.
    pub fn remove_first(&mut self) -> Option<Stop> {
        let stop = self.stops.pop_front()?;
        self.completed += 1;
        Some(stop)
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn first(&self) -> Option<&Stop> {
        self.stops.front()
    }

    pub fn first_tray(&self) -> Option<Tray> {
        self.stops.front().map(|s| s.tray)
    }

    pub fn first_location(&self) -> Option<&str> {
        self.stops.front().map(|s| s.location.as_str())
    }

    /// Number of stops consumed so far; the index of the current stop.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Append the return stop if nothing is left.
    pub fn ensure_return(&mut self, idle_location: &str) {
        if self.stops.is_empty() {
            self.stops.push_back(Stop::home(idle_location));
        }
    }

    /// Drop every remaining stop and head for the idle location instead.
    pub fn skip_to_return(&mut self, idle_location: &str) {
        self.stops.clear();
        self.stops.push_back(Stop::home(idle_location));
    }
}
