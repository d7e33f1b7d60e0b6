//! Error types for the `hoppie-codec` crate.
//!
//! Two failure families exist: [`ValidationError`] for field-level violations
//! detected when a message is constructed from typed inputs, and
//! [`ParseError`] for wire text that does not match the expected grammar.
//! Decoders funnel constructor failures through
//! [`ParseError::Validation`], so decode-time validation is always at least
//! as strict as construction-time validation.

use crate::message::MessageType;

/// Errors produced when constructing or validating message fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A station name was not 3–8 uppercase ASCII alphanumerics.
    #[error("invalid station name \"{value}\": {reason}")]
    InvalidStationName {
        /// The value that failed validation.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// An ICAO airport code was not exactly 4 uppercase ASCII letters.
    #[error("invalid ICAO airport code \"{value}\": {reason}")]
    InvalidAirportCode {
        /// The value that failed validation.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// A telex message violated the ACARS length or charset limits.
    #[error("invalid telex message: {reason}")]
    InvalidTelexMessage {
        /// Human-readable explanation.
        reason: String,
    },

    /// A time-of-day value was outside the 24-hour clock.
    #[error("invalid time of day \"{value}\"")]
    InvalidTimeOfDay {
        /// The offending `HHMM` rendition.
        value: String,
    },

    /// A required field was missing during message construction.
    #[error("missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// An ETA was supplied for a flight whose IN time is already recorded.
    #[error("ETA not allowed once IN time is recorded")]
    EtaAfterArrival,

    /// A ping message requested more stations than the protocol allows.
    #[error("too many ping stations ({count}, limit {limit})")]
    TooManyStations {
        /// Number of stations requested.
        count: usize,
        /// Protocol limit.
        limit: usize,
    },

    /// A CPDLC message element violated the allowed character set.
    #[error("invalid CPDLC message element: {reason}")]
    InvalidCpdlcText {
        /// Human-readable explanation.
        reason: String,
    },

    /// An ADS-C position was outside the valid latitude/longitude range.
    #[error("invalid position ({latitude}, {longitude}): {reason}")]
    InvalidPosition {
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
        /// Human-readable explanation.
        reason: String,
    },
}

/// Errors produced when decoding wire text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// A packet body did not match the grammar of its message type.
    #[error("malformed {msg_type} packet: {reason}")]
    MalformedPacket {
        /// The message type whose grammar was applied.
        msg_type: MessageType,
        /// Human-readable explanation.
        reason: String,
    },

    /// An ADS-C packet did not start with a known contract keyword.
    #[error("unknown ADS-C message format: \"{packet}\"")]
    UnknownAdscKeyword {
        /// The offending packet text.
        packet: String,
    },

    /// The message type has no packet decoder (e.g. poll/peek/ping).
    #[error("message type \"{value}\" not supported for decoding")]
    UnsupportedMessageType {
        /// The type token as received.
        value: String,
    },

    /// The outer server response did not match the `ok`/`error` grammar.
    #[error("malformed response: {reason}")]
    MalformedResponse {
        /// Human-readable explanation.
        reason: String,
    },

    /// A decoded field failed construction-time validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
