//! OOOI progress reports (Out-Off-On-In).
//!
//! A progress packet carries the departure/arrival airport pair plus up to
//! five `LABEL/hhmm` time tokens. OUT is mandatory; the later events form a
//! chain (ON requires OFF, IN requires ON) and an ETA is rejected once the
//! IN time is known.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValidationError};
use crate::message::MessageType;
use crate::station::IcaoAirportCode;

// ---------------------------------------------------------------------------
// TimeOfDay
// ---------------------------------------------------------------------------

/// A UTC wall-clock time with minute resolution, rendered as `HHMM`.
///
/// Constructing from a [`DateTime`] normalises the instant to UTC first, so
/// a timestamp carrying a non-UTC offset encodes correctly shifted.
///
/// # Examples
///
/// ```
/// use hoppie_codec::TimeOfDay;
///
/// let t = TimeOfDay::from_hm(18, 20).unwrap();
/// assert_eq!(t.to_string(), "1820");
///
/// let local = chrono::DateTime::parse_from_rfc3339("2024-05-01T20:20:00+02:00").unwrap();
/// assert_eq!(TimeOfDay::from(local), t);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Create a time of day from an hour (0–23) and minute (0–59).
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or(ValidationError::InvalidTimeOfDay {
                value: format!("{hour:02}{minute:02}"),
            })
    }

    /// Return the underlying [`NaiveTime`] (seconds are always zero).
    pub fn time(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H%M"))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimeOfDay {
    fn from(value: DateTime<Tz>) -> Self {
        let utc = value.with_timezone(&Utc).time();
        Self(utc.with_second(0).unwrap_or(utc))
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H%M")
            .map(Self)
            .map_err(|_| ValidationError::InvalidTimeOfDay { value: s.to_string() })
    }
}

// ---------------------------------------------------------------------------
// ProgressPayload
// ---------------------------------------------------------------------------

/// The payload of an OOOI progress message.
///
/// Wire format:
/// `DEP/ARR OUT/hhmm[ OFF/hhmm][ ON/hhmm][ IN/hhmm][ ETA/hhmm]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgressPayload {
    departure: IcaoAirportCode,
    arrival: IcaoAirportCode,
    time_out: TimeOfDay,
    time_off: Option<TimeOfDay>,
    time_on: Option<TimeOfDay>,
    time_in: Option<TimeOfDay>,
    eta: Option<TimeOfDay>,
}

impl ProgressPayload {
    /// Create a progress payload, enforcing the OOOI chain invariants.
    ///
    /// # Errors
    ///
    /// - ON without OFF, or IN without ON, is a missing-field error.
    /// - ETA combined with IN is rejected (arrival already recorded).
    pub fn new(
        departure: IcaoAirportCode,
        arrival: IcaoAirportCode,
        time_out: TimeOfDay,
        time_off: Option<TimeOfDay>,
        time_on: Option<TimeOfDay>,
        time_in: Option<TimeOfDay>,
        eta: Option<TimeOfDay>,
    ) -> Result<Self, ValidationError> {
        if time_on.is_some() && time_off.is_none() {
            Err(ValidationError::MissingField { field: "OFF time".to_string() })
        } else if time_in.is_some() && time_on.is_none() {
            Err(ValidationError::MissingField { field: "ON time".to_string() })
        } else if eta.is_some() && time_in.is_some() {
            Err(ValidationError::EtaAfterArrival)
        } else {
            Ok(Self { departure, arrival, time_out, time_off, time_on, time_in, eta })
        }
    }

    /// Return the departure airport code.
    pub fn departure(&self) -> &IcaoAirportCode {
        &self.departure
    }

    /// Return the arrival airport code.
    pub fn arrival(&self) -> &IcaoAirportCode {
        &self.arrival
    }

    /// Return the OUT (gate departure) time.
    pub fn time_out(&self) -> TimeOfDay {
        self.time_out
    }

    /// Return the OFF (takeoff) time, if recorded.
    pub fn time_off(&self) -> Option<TimeOfDay> {
        self.time_off
    }

    /// Return the ON (landing) time, if recorded.
    pub fn time_on(&self) -> Option<TimeOfDay> {
        self.time_on
    }

    /// Return the IN (gate arrival) time, if recorded.
    pub fn time_in(&self) -> Option<TimeOfDay> {
        self.time_in
    }

    /// Return the estimated time of arrival, if given.
    pub fn eta(&self) -> Option<TimeOfDay> {
        self.eta
    }

    /// Encode the packet body.
    #[must_use]
    pub fn packet(&self) -> String {
        let mut packet = format!("{}/{} OUT/{}", self.departure, self.arrival, self.time_out);
        if let Some(t) = self.time_off {
            packet.push_str(&format!(" OFF/{t}"));
        }
        if let Some(t) = self.time_on {
            packet.push_str(&format!(" ON/{t}"));
        }
        if let Some(t) = self.time_in {
            packet.push_str(&format!(" IN/{t}"));
        }
        if let Some(t) = self.eta {
            packet.push_str(&format!(" ETA/{t}"));
        }
        packet
    }

    /// Decode a progress packet.
    ///
    /// The `DEP/ARR` pair is anchored at the start; the time tokens are
    /// searched anywhere in the remainder, so received packets may carry
    /// trailing remark text or a `Z` suffix after each time without failing.
    ///
    /// # Errors
    ///
    /// Missing airport pair or OUT token, an out-of-range time value, or a
    /// violated OOOI chain invariant.
    pub fn from_packet(packet: &str) -> Result<Self, ParseError> {
        let (departure, arrival) = parse_airport_pair(packet)?;
        let time_out = find_time_token(packet, "OUT")?.ok_or_else(|| {
            ParseError::MalformedPacket {
                msg_type: MessageType::Progress,
                reason: "missing OUT time".to_string(),
            }
        })?;
        let time_off = find_time_token(packet, "OFF")?;
        let time_on = find_time_token(packet, "ON")?;
        let time_in = find_time_token(packet, "IN")?;
        let eta = find_time_token(packet, "ETA")?;

        Ok(Self::new(departure, arrival, time_out, time_off, time_on, time_in, eta)?)
    }
}

/// Match the anchored `DEP/ARR` head of a progress packet.
fn parse_airport_pair(packet: &str) -> Result<(IcaoAirportCode, IcaoAirportCode), ParseError> {
    let malformed = || ParseError::MalformedPacket {
        msg_type: MessageType::Progress,
        reason: "invalid dep/arr value".to_string(),
    };
    let head = packet.get(..9).ok_or_else(malformed)?;
    let (dep, arr) = head.split_once('/').ok_or_else(malformed)?;
    let departure = IcaoAirportCode::try_from(dep).map_err(|_| malformed())?;
    let arrival = IcaoAirportCode::try_from(arr).map_err(|_| malformed())?;
    Ok((departure, arrival))
}

/// Search for `LABEL/hhmm` anywhere in the packet.
///
/// Occurrences of `LABEL/` that are not followed by four digits are skipped
/// (e.g. `OFF/-----` placeholders). A matching token with an out-of-range
/// time value is an error rather than a skip.
fn find_time_token(packet: &str, label: &str) -> Result<Option<TimeOfDay>, ParseError> {
    let needle = format!("{label}/");
    for (idx, _) in packet.match_indices(&needle) {
        let digits = &packet[idx + needle.len()..];
        if digits.len() >= 4 && digits.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
            return TimeOfDay::from_str(&digits[..4]).map(Some).map_err(ParseError::from);
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(code: &str) -> IcaoAirportCode {
        code.parse().unwrap()
    }

    fn t(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::from_hm(hour, minute).unwrap()
    }

    #[test]
    fn time_of_day_display() {
        assert_eq!(t(18, 20).to_string(), "1820");
        assert_eq!(t(0, 5).to_string(), "0005");
    }

    #[test]
    fn time_of_day_rejects_out_of_range() {
        assert!(TimeOfDay::from_hm(24, 0).is_err());
        assert!("9999".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn time_of_day_normalises_offset_to_utc() {
        let local = DateTime::parse_from_rfc3339("2024-05-01T20:20:30+02:00").unwrap();
        assert_eq!(TimeOfDay::from(local), t(18, 20));
    }

    #[test]
    fn encode_out_only() {
        let payload =
            ProgressPayload::new(airport("EDDF"), airport("LFPG"), t(18, 20), None, None, None, None)
                .unwrap();
        assert_eq!(payload.packet(), "EDDF/LFPG OUT/1820");
    }

    #[test]
    fn encode_full_chain() {
        let payload = ProgressPayload::new(
            airport("EDDF"),
            airport("LFPG"),
            t(18, 20),
            Some(t(18, 35)),
            Some(t(19, 50)),
            Some(t(19, 57)),
            None,
        )
        .unwrap();
        assert_eq!(payload.packet(), "EDDF/LFPG OUT/1820 OFF/1835 ON/1950 IN/1957");
    }

    #[test]
    fn encode_with_eta() {
        let payload = ProgressPayload::new(
            airport("EDDF"),
            airport("LFPG"),
            t(18, 20),
            Some(t(18, 35)),
            None,
            None,
            Some(t(19, 55)),
        )
        .unwrap();
        assert_eq!(payload.packet(), "EDDF/LFPG OUT/1820 OFF/1835 ETA/1955");
    }

    #[test]
    fn on_without_off_rejected() {
        let result = ProgressPayload::new(
            airport("EDDF"),
            airport("LFPG"),
            t(18, 20),
            None,
            Some(t(19, 50)),
            None,
            None,
        );
        assert_eq!(
            result,
            Err(ValidationError::MissingField { field: "OFF time".to_string() })
        );
    }

    #[test]
    fn in_without_on_rejected() {
        let result = ProgressPayload::new(
            airport("EDDF"),
            airport("LFPG"),
            t(18, 20),
            Some(t(18, 35)),
            None,
            Some(t(19, 57)),
            None,
        );
        assert_eq!(
            result,
            Err(ValidationError::MissingField { field: "ON time".to_string() })
        );
    }

    #[test]
    fn eta_after_arrival_rejected() {
        let result = ProgressPayload::new(
            airport("EDDF"),
            airport("LFPG"),
            t(18, 20),
            Some(t(18, 35)),
            Some(t(19, 50)),
            Some(t(19, 57)),
            Some(t(20, 0)),
        );
        assert_eq!(result, Err(ValidationError::EtaAfterArrival));
    }

    #[test]
    fn decode_out_only_with_placeholders() {
        let payload =
            ProgressPayload::from_packet("ZZZZ/ZZZZ OUT/1820 OFF/----- ON/----- ETA/-----").unwrap();
        assert_eq!(payload.time_out(), t(18, 20));
        assert_eq!(payload.time_off(), None);
        assert_eq!(payload.time_on(), None);
        assert_eq!(payload.eta(), None);
    }

    #[test]
    fn decode_tolerates_zulu_suffix() {
        let payload = ProgressPayload::from_packet("EDDF/LFPG OUT/1820Z OFF/1835Z").unwrap();
        assert_eq!(payload.time_out(), t(18, 20));
        assert_eq!(payload.time_off(), Some(t(18, 35)));
    }

    #[test]
    fn decode_ignores_trailing_remark() {
        // Early protocol revisions carried a free-form remark; it is not
        // modelled here and received remark text is dropped on the floor.
        let payload = ProgressPayload::from_packet("EDDF/LFPG OUT/1820 DELAYED DE-ICING").unwrap();
        assert_eq!(payload.packet(), "EDDF/LFPG OUT/1820");
    }

    #[test]
    fn decode_missing_out_rejected() {
        let err = ProgressPayload::from_packet("EDDF/LFPG OFF/1835").unwrap_err();
        assert!(matches!(err, ParseError::MalformedPacket { .. }));
    }

    #[test]
    fn decode_invalid_airport_pair_rejected() {
        assert!(ProgressPayload::from_packet("EDDF-LFPG OUT/1820").is_err());
        assert!(ProgressPayload::from_packet("ED/LF OUT/1820").is_err());
        assert!(ProgressPayload::from_packet("").is_err());
    }

    #[test]
    fn decode_out_of_range_time_rejected() {
        let err = ProgressPayload::from_packet("EDDF/LFPG OUT/9999").unwrap_err();
        assert!(matches!(err, ParseError::Validation(ValidationError::InvalidTimeOfDay { .. })));
    }

    #[test]
    fn decode_chain_invariant_applies() {
        // IN without ON in the received packet violates the OOOI chain.
        let err = ProgressPayload::from_packet("EDDF/LFPG OUT/1820 OFF/1835 IN/1957").unwrap_err();
        assert!(matches!(err, ParseError::Validation(ValidationError::MissingField { .. })));
    }

    #[test]
    fn roundtrip() {
        let payload = ProgressPayload::new(
            airport("EDDF"),
            airport("LFPG"),
            t(18, 20),
            Some(t(18, 35)),
            Some(t(19, 50)),
            None,
            Some(t(19, 57)),
        )
        .unwrap();
        let decoded = ProgressPayload::from_packet(&payload.packet()).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn serde_roundtrip() {
        let payload =
            ProgressPayload::new(airport("EDDF"), airport("LFPG"), t(18, 20), None, None, None, None)
                .unwrap();
        let json = serde_json::to_string(&payload).unwrap();
        let back: ProgressPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(payload, back);
    }
}
