//! ADS-C (Automatic Dependent Surveillance – Contract) payloads.
//!
//! The ADS-C packet family is keyed by a literal leading keyword:
//! `REQUEST PERIODIC <interval>`, `REQUEST CANCEL`, `REPORT CANCEL`,
//! `REPORT <data>` and `REJECT`. A periodic report carries the nested data
//! groups defined by the surveillance contract: the Basic and Flight
//! Identification groups are always present; the Earth Reference and
//! Meteorological groups are optional, and the vertical-rate token can only
//! appear when both optional groups are present (the wire grammar encodes
//! that dependency positionally).

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValidationError};
use crate::message::MessageType;
use crate::station::StationName;
use crate::util::fixed_width_float_str;

// ---------------------------------------------------------------------------
// AdscMessageType
// ---------------------------------------------------------------------------

/// The ADS-C subtype keyword leading every ADS-C packet.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdscMessageType {
    /// Ground station requests a periodic (or demand) contract.
    RequestPeriodic,
    /// Ground station cancels the surveillance contract.
    RequestCancel,
    /// Aircraft cancels its periodic contract.
    CancelPeriodic,
    /// Aircraft transmits a periodic report.
    ReportPeriodic,
    /// Aircraft rejects a contract request.
    Reject,
}

impl AdscMessageType {
    /// The literal keyword carried on the wire.
    pub fn keyword(self) -> &'static str {
        match self {
            AdscMessageType::RequestPeriodic => "REQUEST PERIODIC",
            AdscMessageType::RequestCancel => "REQUEST CANCEL",
            AdscMessageType::CancelPeriodic => "REPORT CANCEL",
            AdscMessageType::ReportPeriodic => "REPORT",
            AdscMessageType::Reject => "REJECT",
        }
    }
}

impl fmt::Display for AdscMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ---------------------------------------------------------------------------
// Data groups
// ---------------------------------------------------------------------------

/// Vertical-rate indication of the Earth Reference group.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
)]
pub enum VerticalRate {
    /// Climbing.
    #[strum(serialize = "CLB")]
    Climb,
    /// Level flight.
    #[strum(serialize = "LVL")]
    Level,
    /// Descending.
    #[strum(serialize = "DES")]
    Descent,
}

/// ADS-C Basic group: report timestamp, position and altitude.
///
/// Only the day, hour and minute of the timestamp are carried on the wire;
/// equality ignores month and year accordingly.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BasicGroup {
    timestamp: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    altitude: f64,
}

impl BasicGroup {
    /// Create a Basic group.
    ///
    /// # Errors
    ///
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180] degrees.
    pub fn new(
        timestamp: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::InvalidPosition {
                latitude,
                longitude,
                reason: "latitude must be in [-90, 90], longitude in [-180, 180]".to_string(),
            });
        }
        Ok(Self { timestamp, latitude, longitude, altitude })
    }

    /// Return the report timestamp (month and year are not significant).
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Return the latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Return the longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Return the altitude in feet.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}

impl PartialEq for BasicGroup {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp.day() == other.timestamp.day()
            && self.timestamp.hour() == other.timestamp.hour()
            && self.timestamp.minute() == other.timestamp.minute()
            && self.latitude == other.latitude
            && self.longitude == other.longitude
            && self.altitude == other.altitude
    }
}

/// ADS-C Flight Identification group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlightIdentGroup {
    /// Aircraft identification (callsign).
    pub acft_ident: StationName,
}

/// ADS-C Earth Reference group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EarthRefGroup {
    /// True track in degrees.
    pub true_track: f64,
    /// Ground speed in knots.
    pub ground_speed: f64,
    /// Vertical rate, if reported. Only encodable when the Meteorological
    /// group is present as well.
    pub vertical_rate: Option<VerticalRate>,
}

/// ADS-C Meteorological group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeteoGroup {
    /// Wind direction in degrees.
    pub wind_direction: f64,
    /// Wind speed in knots.
    pub wind_speed: f64,
    /// Outside air temperature in degrees Celsius.
    pub temperature: f64,
}

/// The data groups of an ADS-C periodic report.
///
/// The Meteorological group is only meaningful when the Earth Reference
/// group is present; the encoder honors the nesting by construction and the
/// decoder by grammar.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdscData {
    /// Basic group (always present).
    pub basic: BasicGroup,
    /// Flight identification group (always present).
    pub flight_ident: FlightIdentGroup,
    /// Earth reference group.
    pub earth_ref: Option<EarthRefGroup>,
    /// Meteorological group.
    pub meteo: Option<MeteoGroup>,
}

// ---------------------------------------------------------------------------
// AdscPayload
// ---------------------------------------------------------------------------

/// The payload of an ADS-C message.
///
/// # Examples
///
/// ```
/// use hoppie_codec::AdscPayload;
///
/// let request = AdscPayload::PeriodicContractRequest { interval: 300 };
/// assert_eq!(request.packet(), "REQUEST PERIODIC 300");
///
/// let cancel = AdscPayload::from_packet("REQUEST CANCEL").unwrap();
/// assert_eq!(cancel, AdscPayload::ContractCancellation);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum AdscPayload {
    /// Periodic contract request with a reporting interval in seconds.
    /// An interval of 0 is a demand contract request.
    PeriodicContractRequest {
        /// Reporting interval in seconds.
        interval: u32,
    },
    /// Surveillance contract cancellation (ground side).
    ContractCancellation,
    /// Periodic contract cancellation (aircraft side).
    PeriodicContractCancellation,
    /// Periodic position report.
    PeriodicReport(AdscData),
    /// Contract rejection.
    ContractRejection,
}

impl AdscPayload {
    /// Return the ADS-C subtype keyword of this payload.
    pub fn message_type(&self) -> AdscMessageType {
        match self {
            AdscPayload::PeriodicContractRequest { .. } => AdscMessageType::RequestPeriodic,
            AdscPayload::ContractCancellation => AdscMessageType::RequestCancel,
            AdscPayload::PeriodicContractCancellation => AdscMessageType::CancelPeriodic,
            AdscPayload::PeriodicReport(_) => AdscMessageType::ReportPeriodic,
            AdscPayload::ContractRejection => AdscMessageType::Reject,
        }
    }

    /// Check whether this payload is a demand contract request
    /// (periodic request with interval 0).
    pub fn is_demand_contract_request(&self) -> bool {
        matches!(self, AdscPayload::PeriodicContractRequest { interval: 0 })
    }

    /// Encode the packet body: the subtype keyword followed by the
    /// subtype-specific data part, if any.
    #[must_use]
    pub fn packet(&self) -> String {
        let keyword = self.message_type().keyword();
        match self {
            AdscPayload::PeriodicContractRequest { interval } => format!("{keyword} {interval}"),
            AdscPayload::PeriodicReport(data) => format!("{keyword} {}", data.report_body()),
            _ => keyword.to_string(),
        }
    }

    /// Decode an ADS-C packet via ordered-prefix dispatch on the leading
    /// keyword. `REPORT CANCEL` is matched before the bare `REPORT` report
    /// keyword it shadows.
    ///
    /// # Errors
    ///
    /// An unknown leading keyword, or a malformed data part for the matched
    /// subtype.
    pub fn from_packet(packet: &str) -> Result<Self, ParseError> {
        if let Some(rest) = packet.strip_prefix(AdscMessageType::RequestPeriodic.keyword()) {
            let interval = rest
                .strip_prefix(char::is_whitespace)
                .and_then(parse_leading_interval)
                .ok_or_else(|| ParseError::MalformedPacket {
                    msg_type: MessageType::AdsC,
                    reason: "invalid contract request interval".to_string(),
                })?;
            Ok(AdscPayload::PeriodicContractRequest { interval })
        } else if packet.starts_with(AdscMessageType::RequestCancel.keyword()) {
            Ok(AdscPayload::ContractCancellation)
        } else if packet.starts_with(AdscMessageType::CancelPeriodic.keyword()) {
            Ok(AdscPayload::PeriodicContractCancellation)
        } else if let Some(rest) = packet.strip_prefix(AdscMessageType::ReportPeriodic.keyword()) {
            let body = rest.strip_prefix(char::is_whitespace).unwrap_or(rest);
            Ok(AdscPayload::PeriodicReport(AdscData::from_report_body(body)?))
        } else if packet.starts_with(AdscMessageType::Reject.keyword()) {
            Ok(AdscPayload::ContractRejection)
        } else {
            Err(ParseError::UnknownAdscKeyword { packet: packet.to_string() })
        }
    }
}

/// Parse the decimal interval immediately following `REQUEST PERIODIC `.
/// Trailing non-digit text is ignored, matching the tolerant report grammar.
fn parse_leading_interval(s: &str) -> Option<u32> {
    let digits = s.as_bytes().iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    s[..digits].parse().ok()
}

// ---------------------------------------------------------------------------
// Report body codec
// ---------------------------------------------------------------------------

impl AdscData {
    /// Encode the report data part:
    /// `IDENT ddhhmm LAT LON ALT[ TRK GS[ WDIR/WSPD TEMP[ VRATE]]]`.
    ///
    /// Coordinates render at a fixed total width of 8; track and wind
    /// direction are zero-padded to three digits.
    #[must_use]
    pub fn report_body(&self) -> String {
        let basic = &self.basic;
        let mut packet = format!(
            "{} {} {} {} {:.0}",
            self.flight_ident.acft_ident,
            basic.timestamp().format("%d%H%M"),
            fixed_width_float_str(basic.latitude(), 8),
            fixed_width_float_str(basic.longitude(), 8),
            basic.altitude(),
        );
        if let Some(earth_ref) = &self.earth_ref {
            packet.push_str(&format!(
                " {:03.0} {:.0}",
                earth_ref.true_track, earth_ref.ground_speed
            ));
            if let Some(meteo) = &self.meteo {
                packet.push_str(&format!(
                    " {:03.0}/{:.0} {:.0}",
                    meteo.wind_direction, meteo.wind_speed, meteo.temperature
                ));
                if let Some(vertical_rate) = earth_ref.vertical_rate {
                    packet.push_str(&format!(" {vertical_rate}"));
                }
            }
        }
        packet
    }

    /// Decode the report data part.
    ///
    /// The mandatory head (ident, timestamp, position, altitude) uses strict
    /// digit-count checks. The optional tail groups are attempted in
    /// dependency order: a group that fails to match terminates the tail
    /// without error, so a trailing vertical-rate token can never attach
    /// unless both the Earth Reference and Meteorological groups matched.
    ///
    /// # Errors
    ///
    /// A missing or malformed mandatory field.
    pub fn from_report_body(body: &str) -> Result<Self, ParseError> {
        let malformed = |reason: &str| ParseError::MalformedPacket {
            msg_type: MessageType::AdsC,
            reason: reason.to_string(),
        };

        let mut tokens = body.split_whitespace();

        let acft_ident: StationName = tokens
            .next()
            .ok_or_else(|| malformed("missing aircraft ident"))?
            .parse()
            .map_err(|_| malformed("invalid aircraft ident"))?;

        let timestamp = tokens
            .next()
            .and_then(parse_report_timestamp)
            .ok_or_else(|| malformed("invalid report timestamp"))?;

        let latitude = tokens
            .next()
            .and_then(|t| parse_fixed_decimal(t, 1..=2, 4..=6))
            .ok_or_else(|| malformed("invalid latitude"))?;
        let longitude = tokens
            .next()
            .and_then(|t| parse_fixed_decimal(t, 1..=3, 3..=6))
            .ok_or_else(|| malformed("invalid longitude"))?;
        let altitude = tokens
            .next()
            .and_then(|t| parse_unsigned(t, 1..=5))
            .ok_or_else(|| malformed("invalid altitude"))?;

        let basic = BasicGroup::new(timestamp, latitude, longitude, altitude)?;
        let flight_ident = FlightIdentGroup { acft_ident };

        let tail: Vec<&str> = tokens.collect();
        let mut earth_ref = None;
        let mut meteo = None;

        if tail.len() >= 2 {
            if let (Some(true_track), Some(ground_speed)) =
                (parse_unsigned(tail[0], 3..=3), parse_unsigned(tail[1], 1..=3))
            {
                let mut group = EarthRefGroup { true_track, ground_speed, vertical_rate: None };
                if tail.len() >= 4 {
                    if let (Some((wind_direction, wind_speed)), Some(temperature)) =
                        (parse_wind(tail[2]), parse_signed(tail[3], 1..=3))
                    {
                        meteo = Some(MeteoGroup { wind_direction, wind_speed, temperature });
                        if tail.len() >= 5 {
                            if let Ok(rate) = tail[4].parse::<VerticalRate>() {
                                group.vertical_rate = Some(rate);
                            }
                        }
                    }
                }
                earth_ref = Some(group);
            }
        }

        Ok(Self { basic, flight_ident, earth_ref, meteo })
    }
}

/// Parse a `ddhhmm` report timestamp. The date anchors to an arbitrary
/// fixed month since only day/hour/minute are significant.
fn parse_report_timestamp(token: &str) -> Option<DateTime<Utc>> {
    if token.len() != 6 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = token[..2].parse().ok()?;
    let hour: u32 = token[2..4].parse().ok()?;
    let minute: u32 = token[4..6].parse().ok()?;
    Utc.with_ymd_and_hms(1900, 1, day, hour, minute, 0).single()
}

/// Parse a signed fixed-point decimal with constrained digit counts on both
/// sides of the point.
fn parse_fixed_decimal(
    token: &str,
    int_digits: RangeInclusive<usize>,
    frac_digits: RangeInclusive<usize>,
) -> Option<f64> {
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    let (int_part, frac_part) = unsigned.split_once('.')?;
    let well_formed = int_digits.contains(&int_part.len())
        && frac_digits.contains(&frac_part.len())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit());
    if well_formed {
        token.parse().ok()
    } else {
        None
    }
}

/// Parse an unsigned integer field with a constrained digit count.
fn parse_unsigned(token: &str, digits: RangeInclusive<usize>) -> Option<f64> {
    if digits.contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

/// Parse an optionally negative integer field with a constrained digit count.
fn parse_signed(token: &str, digits: RangeInclusive<usize>) -> Option<f64> {
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    parse_unsigned(unsigned, digits).map(|v| if token.starts_with('-') { -v } else { v })
}

/// Parse a `DDD/S[SS]` wind token into direction and speed.
fn parse_wind(token: &str) -> Option<(f64, f64)> {
    let (direction, speed) = token.split_once('/')?;
    Some((parse_unsigned(direction, 3..=3)?, parse_unsigned(speed, 1..=3)?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
