//! Report kind definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of weather report to fetch.
///
/// The remote service exposes current observations (METAR) and terminal
/// forecasts (TAF) under separate endpoint paths with the same response
/// envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Current surface observations.
    #[default]
    Metar,
    /// Terminal aerodrome forecasts.
    Taf,
}

impl ReportType {
    /// Returns the endpoint path segment for this report kind.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Metar => "metar",
            Self::Taf => "taf",
        }
    }

    /// Returns the XML element name that carries one record of this kind.
    #[must_use]
    pub const fn element_name(&self) -> &'static str {
        match self {
            Self::Metar => "METAR",
            Self::Taf => "TAF",
        }
    }

    /// Returns the report kind as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.path()
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = ReportTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metar" | "metars" => Ok(Self::Metar),
            "taf" | "tafs" => Ok(Self::Taf),
            _ => Err(ReportTypeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid report kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTypeParseError(String);

impl std::fmt::Display for ReportTypeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid report type '{}', expected metar or taf", self.0)
    }
}

impl std::error::Error for ReportTypeParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_type_paths() {
        assert_eq!(ReportType::Metar.path(), "metar");
        assert_eq!(ReportType::Taf.path(), "taf");
        assert_eq!(ReportType::Metar.element_name(), "METAR");
        assert_eq!(ReportType::Taf.element_name(), "TAF");
    }

    #[test]
    fn test_report_type_parse() {
        assert_eq!("metar".parse::<ReportType>().unwrap(), ReportType::Metar);
        assert_eq!("TAF".parse::<ReportType>().unwrap(), ReportType::Taf);
        assert!("sigmet".parse::<ReportType>().is_err());
    }
}
