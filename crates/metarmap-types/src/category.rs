//! Flight category levels.
//!
//! Classification (ceiling/visibility thresholds) is performed by display
//! collaborators; this crate only defines the shared vocabulary.

use serde::{Deserialize, Serialize};

/// The four standard flight categories, from best to worst conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    /// Visual flight rules.
    Vfr,
    /// Marginal visual flight rules.
    Mvfr,
    /// Instrument flight rules.
    Ifr,
    /// Low instrument flight rules.
    Lifr,
}

impl FlightCategory {
    /// Returns the category as its conventional abbreviation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vfr => "VFR",
            Self::Mvfr => "MVFR",
            Self::Ifr => "IFR",
            Self::Lifr => "LIFR",
        }
    }

    /// Returns all categories, best conditions first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Vfr, Self::Mvfr, Self::Ifr, Self::Lifr]
    }
}

impl std::fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
