//! CPDLC (Controller–Pilot Data Link Communications) payloads.
//!
//! The wire format is the FANS `data2` exchange shape:
//! `/data2/<min>/<mrn-or-empty>/<rr>/<message>`, with the message element
//! restricted to uppercase letters, digits, `.`, `_`, `@` and space.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValidationError};
use crate::message::MessageType;

/// Exchange-format discriminator carried as the first packet element.
const EXCHANGE_FORMAT: &str = "data2";

// ---------------------------------------------------------------------------
// ResponseRequirement
// ---------------------------------------------------------------------------

/// The response requirement attached to a CPDLC message element.
///
/// Dictates which replies may close the dialogue opened by the message.
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
    strum::EnumIter,
)]
pub enum ResponseRequirement {
    /// Wilco / Unable.
    #[strum(serialize = "WU")]
    WilcoUnable,
    /// Affirm / Negative.
    #[strum(serialize = "AN")]
    AffirmNegative,
    /// Roger.
    #[strum(serialize = "R")]
    Roger,
    /// No response enabled.
    #[strum(serialize = "NE")]
    NotRequired,
    /// No response expected.
    #[strum(serialize = "N")]
    No,
    /// Any responding message accepted.
    #[strum(serialize = "Y")]
    Yes,
}

// ---------------------------------------------------------------------------
// CpdlcPayload
// ---------------------------------------------------------------------------

/// The payload of a CPDLC message.
///
/// # Examples
///
/// ```
/// use hoppie_codec::{CpdlcPayload, ResponseRequirement};
///
/// let payload = CpdlcPayload::new(2, Some(1), ResponseRequirement::No, "WILCO").unwrap();
/// assert_eq!(payload.packet(), "/data2/2/1/N/WILCO");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CpdlcPayload {
    min: u32,
    mrn: Option<u32>,
    rr: ResponseRequirement,
    message: String,
}

impl CpdlcPayload {
    /// Create a CPDLC payload.
    ///
    /// `min` is the Message Identification Number, `mrn` the optional
    /// Message Reference Number of the message being answered.
    ///
    /// # Errors
    ///
    /// The message element must be non-empty and restricted to
    /// `[A-Z0-9._@ ]`.
    pub fn new(
        min: u32,
        mrn: Option<u32>,
        rr: ResponseRequirement,
        message: &str,
    ) -> Result<Self, ValidationError> {
        if message.is_empty() {
            Err(ValidationError::InvalidCpdlcText {
                reason: "message element must not be empty".to_string(),
            })
        } else if !message.bytes().all(is_message_char) {
            Err(ValidationError::InvalidCpdlcText {
                reason: "message element contains invalid characters".to_string(),
            })
        } else {
            Ok(Self { min, mrn, rr, message: message.to_string() })
        }
    }

    /// Return the Message Identification Number (MIN).
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Return the Message Reference Number (MRN), if present.
    pub fn mrn(&self) -> Option<u32> {
        self.mrn
    }

    /// Return the response requirement.
    pub fn rr(&self) -> ResponseRequirement {
        self.rr
    }

    /// Return the message element text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Encode the packet body. An absent MRN renders as an empty field
    /// (double slash).
    #[must_use]
    pub fn packet(&self) -> String {
        format!(
            "/{EXCHANGE_FORMAT}/{}/{}/{}/{}",
            self.min,
            self.mrn.map(|m| m.to_string()).unwrap_or_default(),
            self.rr,
            self.message,
        )
    }

    /// Decode a CPDLC packet.
    ///
    /// # Errors
    ///
    /// Missing `/data2/` prefix, non-numeric MIN/MRN, an unknown response
    /// requirement code, or a message element outside the allowed charset.
    pub fn from_packet(packet: &str) -> Result<Self, ParseError> {
        let malformed = |reason: &str| ParseError::MalformedPacket {
            msg_type: MessageType::Cpdlc,
            reason: reason.to_string(),
        };

        let prefix = format!("/{EXCHANGE_FORMAT}/");
        let rest = packet
            .strip_prefix(&prefix)
            .ok_or_else(|| malformed("missing /data2/ prefix"))?;

        let mut parts = rest.splitn(4, '/');
        let min_part = parts.next().ok_or_else(|| malformed("missing MIN"))?;
        let mrn_part = parts.next().ok_or_else(|| malformed("missing MRN"))?;
        let rr_part = parts.next().ok_or_else(|| malformed("missing response requirement"))?;
        let message = parts.next().ok_or_else(|| malformed("missing message element"))?;

        let min = parse_decimal(min_part).ok_or_else(|| malformed("invalid MIN"))?;
        let mrn = if mrn_part.is_empty() {
            None
        } else {
            Some(parse_decimal(mrn_part).ok_or_else(|| malformed("invalid MRN"))?)
        };
        let rr = ResponseRequirement::from_str(rr_part)
            .map_err(|_| malformed("invalid response requirement"))?;

        Ok(Self::new(min, mrn, rr, message)?)
    }
}

impl fmt::Display for CpdlcPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.packet())
    }
}

/// Allowed characters of a CPDLC message element.
fn is_message_char(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || matches!(b, b'.' | b'_' | b'@' | b' ')
}

/// Parse an unsigned decimal field, rejecting signs and non-digits.
fn parse_decimal(s: &str) -> Option<u32> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
