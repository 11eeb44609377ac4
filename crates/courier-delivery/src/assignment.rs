//! Tray-to-destination bindings built up while the robot is idle.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::job::{Job, Stop};
use crate::tray::Tray;

/// Whether one destination may be served by several trays in the same job.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DestinationPolicy {
    /// A bound destination is greyed out for every other tray.
    #[default]
    Exclusive,
    /// Several trays may share a destination; their stops are kept adjacent.
    Grouped,
}

/// One entry of the destination grid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub name: String,
    pub bound_to: Vec<Tray>,
    pub selectable: bool,
}

/// Result of a successful [`TrayAssignment::bind_location`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub tray: Tray,
    /// Destination the tray was bound to before, if it was.
    pub replaced: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrayAssignment {
    bindings: BTreeMap<Tray, String>,
    selected: Option<Tray>,
    pending: Vec<Stop>,
    policy: DestinationPolicy,
}

impl TrayAssignment {
    pub fn new(policy: DestinationPolicy) -> Self {
        TrayAssignment {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> DestinationPolicy {
        self.policy
    }

    pub fn bindings(&self) -> &BTreeMap<Tray, String> {
        &self.bindings
    }

    pub fn selected(&self) -> Option<Tray> {
        self.selected
    }

    pub fn pending(&self) -> &[Stop] {
        &self.pending
    }

    /// Toggle the tray awaiting a destination. Returns the new selection.
    pub fn select_tray(&mut self, tray: Tray) -> Option<Tray> {
        self.selected = if self.selected == Some(tray) {
            None
        } else {
            Some(tray)
        };
        self.selected
    }

    /// Whether `name` may be picked for the selected tray.
    pub fn is_selectable(&self, name: &str, idle_location: &str) -> bool {
        if name.is_empty() || name == idle_location {
            return false;
        }
        match self.policy {
            DestinationPolicy::Grouped => true,
            DestinationPolicy::Exclusive => {
                // Re-picking the selected tray's own destination is harmless.
                !self
                    .bindings
                    .iter()
                    .any(|(tray, bound)| bound == name && Some(*tray) != self.selected)
            }
        }
    }

    /// Bind `name` to the selected tray and clear the selection.
    ///
    /// Returns `None`, leaving everything as it was, when no tray is selected
    /// or the destination is not selectable.
    pub fn bind_location(&mut self, name: &str, idle_location: &str) -> Option<Bound> {
        let tray = self.selected?;
        if !self.is_selectable(name, idle_location) {
            return None;
        }

        let replaced = self.bindings.insert(tray, name.to_string());
        if replaced.is_some() {
            self.pending.retain(|stop| stop.tray != tray);
        }

        let stop = Stop::delivery(name, tray);
        match self.pending.iter().rposition(|s| s.location == name) {
            Some(last) => self.pending.insert(last + 1, stop),
            None => self.pending.push(stop),
        }
        self.selected = None;
        Some(Bound { tray, replaced })
    }

    /// Remove the tray's binding and its pending stop. Returns the destination
    /// it was bound to, or `None` if it was not bound.
    pub fn unbind_tray(&mut self, tray: Tray) -> Option<String> {
        let name = self.bindings.remove(&tray)?;
        if let Some(index) = self.pending.iter().position(|s| s.tray == tray) {
            self.pending.remove(index);
        }
        Some(name)
    }

    pub fn can_start(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Freeze the pending stops into a job. `None` while nothing is bound.
    pub fn take_job(&mut self) -> Option<Job> {
        if !self.can_start() {
            return None;
        }
        self.bindings.clear();
        self.selected = None;
        Some(Job::from_stops(self.pending.drain(..)))
    }

    /// The destination grid: `locations` without the idle location, sorted,
    /// each marked with the trays bound to it and whether it can be picked.
    pub fn destinations(&self, locations: &[String], idle_location: &str) -> Vec<Destination> {
        let mut names: Vec<&String> = locations
            .iter()
            .filter(|name| name.as_str() != idle_location && !name.is_empty())
            .collect();
        names.sort();
        names.dedup();
        names
            .into_iter()
            .map(|name| Destination {
                name: name.clone(),
                bound_to: self
                    .bindings
                    .iter()
                    .filter(|(_, bound)| *bound == name)
                    .map(|(tray, _)| *tray)
                    .collect(),
                selectable: self.is_selectable(name, idle_location),
            })
            .collect()
    }
}
