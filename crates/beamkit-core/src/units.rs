//! Measurement units for emitted programs.
//!
//! The pipeline itself is unit-agnostic: the orientation transform already
//! maps document coordinates into whatever unit system the machine-side
//! orientation points were given in. `Units` only selects the G-code unit
//! word and the coordinate precision of the output text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit system of the emitted program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Millimeters (`G21`)
    Mm,
    /// Inches (`G20`)
    Inch,
}

impl Units {
    /// Unit-selection word for the program preamble.
    pub fn gcode_word(self) -> &'static str {
        match self {
            Self::Mm => "G21",
            Self::Inch => "G20",
        }
    }

    /// Short label for display ("mm" or "in").
    pub fn label(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Inch => "in",
        }
    }

    /// Default fixed-point digits for coordinates in this system. Inch
    /// programs get one more digit since an inch is coarser than a
    /// millimeter.
    pub fn default_decimals(self) -> u8 {
        match self {
            Self::Mm => 3,
            Self::Inch => 4,
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::Mm
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mm" | "metric" | "g21" => Ok(Self::Mm),
            "inch" | "in" | "imperial" | "g20" => Ok(Self::Inch),
            _ => Err(format!("Unknown unit system: {}", s)),
        }
    }
}
