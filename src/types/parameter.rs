//! Defines the climate parameters that have their own partition folder.

use std::fmt;
use std::str::FromStr;

/// A measured climate parameter. Each parameter is stored in its own folder
/// of yearly parquet partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Parameter {
    /// Daily rainfall amount.
    Rainfall,
    /// Daily minimum temperature.
    Tmin,
    /// Daily maximum temperature.
    Tmax,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [Parameter::Rainfall, Parameter::Tmin, Parameter::Tmax];

    /// Name of the folder (and file suffix) used by the partition layout,
    /// e.g. `data/rain/2020_rain.parquet`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Parameter::Rainfall => "rain",
            Parameter::Tmin => "tmin",
            Parameter::Tmax => "tmax",
        }
    }

    /// Folder names tried in order when locating the partitions of this parameter.
    pub(crate) fn folder_candidates(&self) -> &'static [&'static str] {
        match self {
            Parameter::Rainfall => &["rain", "rainfall"],
            Parameter::Tmin => &["tmin"],
            Parameter::Tmax => &["tmax"],
        }
    }
}

/// Formats a `Parameter` using its `path_segment`.
///
/// # Examples
///
/// ```
/// use tehsil_weather::Parameter;
///
/// assert_eq!(Parameter::Rainfall.to_string(), "rain");
/// assert_eq!(format!("{}", Parameter::Tmax), "tmax");
/// ```
impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown climate parameter '{0}', expected one of rain, rainfall, tmin, tmax")]
pub struct ParseParameterError(pub String);

impl FromStr for Parameter {
    type Err = ParseParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rain" | "rainfall" => Ok(Parameter::Rainfall),
            "tmin" => Ok(Parameter::Tmin),
            "tmax" => Ok(Parameter::Tmax),
            _ => Err(ParseParameterError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reconciles_variant_names() {
        assert_eq!("rain".parse::<Parameter>(), Ok(Parameter::Rainfall));
        assert_eq!("Rainfall".parse::<Parameter>(), Ok(Parameter::Rainfall));
        assert_eq!(" TMIN ".parse::<Parameter>(), Ok(Parameter::Tmin));
        assert_eq!("tmax".parse::<Parameter>(), Ok(Parameter::Tmax));
        assert!("humidity".parse::<Parameter>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for parameter in Parameter::ALL {
            assert_eq!(parameter.to_string().parse::<Parameter>(), Ok(parameter));
        }
    }
}
