//! Station and airport identifiers.
//!
//! A [`StationName`] is the addressing unit of the network: an aircraft
//! callsign, an airline/ATC organisation code, or the reserved `SERVER`
//! endpoint. [`IcaoAirportCode`] is the four-letter airport designator used
//! by OOOI progress reports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reserved wildcard used in a ping station list to query every online
/// station. Not a valid [`StationName`] — it only exists inside the ping
/// packet grammar.
pub const ALL_CALLSIGNS: &str = "ALL-CALLSIGNS";

// ---------------------------------------------------------------------------
// StationName
// ---------------------------------------------------------------------------

/// A validated station name: 3–8 uppercase ASCII alphanumerics.
///
/// # Examples
///
/// ```
/// use hoppie_codec::StationName;
///
/// let name: StationName = "AFR1234".parse().unwrap();
/// assert_eq!(name.as_str(), "AFR1234");
///
/// assert!("ops".parse::<StationName>().is_err());
/// assert!("D-ABCD".parse::<StationName>().is_err());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationName(String);

impl StationName {
    /// The reserved name of the central server endpoint.
    pub fn server() -> Self {
        Self("SERVER".to_string())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that a string is 3–8 uppercase ASCII letters or digits.
    fn validate(s: &str) -> Result<(), ValidationError> {
        let shaped = (3..=8).contains(&s.len())
            && s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if shaped {
            Ok(())
        } else {
            Err(ValidationError::InvalidStationName {
                value: s.to_string(),
                reason: "must be 3-8 uppercase ASCII letters or digits".to_string(),
            })
        }
    }

    /// Check whether a token has the station-name shape without building one.
    pub(crate) fn is_shaped(s: &str) -> bool {
        Self::validate(s).is_ok()
    }
}

impl fmt::Display for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for StationName {
    type Error = ValidationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for StationName {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl FromStr for StationName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

// ---------------------------------------------------------------------------
// IcaoAirportCode
// ---------------------------------------------------------------------------

/// A validated four-letter ICAO airport code (e.g. `"LFPG"`, `"KJFK"`).
///
/// # Examples
///
/// ```
/// use hoppie_codec::IcaoAirportCode;
///
/// let code: IcaoAirportCode = "EDDF".parse().unwrap();
/// assert_eq!(code.to_string(), "EDDF");
///
/// assert!("LAX".parse::<IcaoAirportCode>().is_err());
/// assert!("AB01".parse::<IcaoAirportCode>().is_err());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct IcaoAirportCode(String);

impl IcaoAirportCode {
    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that a string is exactly 4 uppercase ASCII letters.
    fn validate(s: &str) -> Result<(), ValidationError> {
        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(())
        } else {
            Err(ValidationError::InvalidAirportCode {
                value: s.to_string(),
                reason: "must be exactly 4 uppercase ASCII letters".to_string(),
            })
        }
    }
}

impl fmt::Display for IcaoAirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for IcaoAirportCode {
    type Error = ValidationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for IcaoAirportCode {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl FromStr for IcaoAirportCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
