use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the three payload compartments, ordered top to bottom.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tray {
    /// Top tray, wire index 0.
    Top,
    /// Middle tray, wire index 1.
    Middle,
    /// Bottom tray, wire index 2.
    Bottom,
}

impl Tray {
    /// All trays, top to bottom.
    pub const ALL: [Tray; 3] = [Tray::Top, Tray::Middle, Tray::Bottom];

    /// Index used in serial frames.
    pub const fn index(self) -> u8 {
        match self {
            Tray::Top => 0,
            Tray::Middle => 1,
            Tray::Bottom => 2,
        }
    }

    /// Tray for a wire index, if there is one.
    pub const fn from_index(index: u8) -> Option<Tray> {
        match index {
            0 => Some(Tray::Top),
            1 => Some(Tray::Middle),
            2 => Some(Tray::Bottom),
            _ => None,
        }
    }

    /// Lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Tray::Top => "top",
            Tray::Middle => "middle",
            Tray::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Tray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tray {
    type Err = String;

    /// Accepts a name (`top`, `middle`, `bottom`) or a wire index (`0`..`2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(tray) = Tray::ALL.iter().find(|t| t.name().eq_ignore_ascii_case(s)) {
            return Ok(*tray);
        }
        s.parse::<u8>()
            .ok()
            .and_then(Tray::from_index)
            .ok_or_else(|| format!("unknown tray '{}'", s))
    }
}
