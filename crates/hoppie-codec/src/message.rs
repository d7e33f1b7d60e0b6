//! Message model: the closed set of message variants, the transport
//! envelope, and the packet dispatcher.
//!
//! A [`Message`] owns the common `from`/`to` addressing plus a per-variant
//! [`Payload`]. The wire packet is always derived from the payload fields —
//! [`Message::envelope`] produces the flattened
//! `{from, to, type, packet}` tuple handed to the transport, and
//! [`Message::from_packet`] is the inverse dispatch for received items.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::adsc::AdscPayload;
use crate::cpdlc::CpdlcPayload;
use crate::error::{ParseError, ValidationError};
use crate::progress::ProgressPayload;
use crate::response::ResponseItem;
use crate::station::{StationName, ALL_CALLSIGNS};

/// Maximum telex message length imposed by the ACARS specification.
const TELEX_MAX_LEN: usize = 220;

/// Maximum number of stations in a single ping query.
const PING_MAX_STATIONS: usize = 24;

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// The closed set of message type tags, spelled on the wire in lowercase
/// (`ads-c`, `progress`, `telex`, `poll`, `peek`, `ping`, `cpdlc`).
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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MessageType {
    /// ADS-C surveillance contract traffic.
    AdsC,
    /// OOOI progress report.
    Progress,
    /// Free-text telex.
    Telex,
    /// Retrieve unread messages and appear online.
    Poll,
    /// Retrieve messages without appearing online.
    Peek,
    /// Station presence query.
    Ping,
    /// CPDLC clearance exchange.
    Cpdlc,
}

// ---------------------------------------------------------------------------
// TelexPayload
// ---------------------------------------------------------------------------

/// The payload of a free-text telex message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TelexPayload {
    message: String,
}

impl TelexPayload {
    /// Create a telex payload. The text is stored uppercased, matching the
    /// wire rendition, so a payload always compares equal to its own decode.
    ///
    /// # Errors
    ///
    /// The text must be ASCII and at most 220 characters.
    pub fn new(message: &str) -> Result<Self, ValidationError> {
        if message.len() > TELEX_MAX_LEN {
            Err(ValidationError::InvalidTelexMessage {
                reason: format!("message too long ({} > {TELEX_MAX_LEN})", message.len()),
            })
        } else if !message.is_ascii() {
            Err(ValidationError::InvalidTelexMessage {
                reason: "message contains non-ASCII characters".to_string(),
            })
        } else {
            Ok(Self { message: message.to_ascii_uppercase() })
        }
    }

    /// Return the message text (uppercased at construction).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Encode the packet body: the message text.
    #[must_use]
    pub fn packet(&self) -> String {
        self.message.clone()
    }

    /// Decode a telex packet (the body is the text itself).
    ///
    /// # Errors
    ///
    /// Same limits as construction.
    pub fn from_packet(packet: &str) -> Result<Self, ParseError> {
        Ok(Self::new(packet)?)
    }
}

// ---------------------------------------------------------------------------
// PingStations
// ---------------------------------------------------------------------------

/// The station set queried by a ping message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PingStations {
    /// Query every online station (encodes the reserved `ALL-CALLSIGNS`).
    All,
    /// Query an explicit station list; empty means a bare presence query.
    List(Vec<StationName>),
}

impl PingStations {
    /// Encode the packet body: the space-joined station list.
    #[must_use]
    pub fn packet(&self) -> String {
        match self {
            PingStations::All => ALL_CALLSIGNS.to_string(),
            PingStations::List(stations) => stations
                .iter()
                .map(StationName::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload / Message
// ---------------------------------------------------------------------------

/// The per-variant payload of a [`Message`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum Payload {
    /// Free-text telex.
    Telex(TelexPayload),
    /// OOOI progress report.
    Progress(ProgressPayload),
    /// Peek request (no payload).
    Peek,
    /// Poll request (no payload).
    Poll,
    /// Station presence query.
    Ping(PingStations),
    /// ADS-C contract traffic.
    #[serde(rename = "ads-c")]
    Adsc(AdscPayload),
    /// CPDLC clearance exchange.
    Cpdlc(CpdlcPayload),
}

impl Payload {
    /// Return the message type tag of this payload.
    pub fn message_type(&self) -> MessageType {
        match self {
            Payload::Telex(_) => MessageType::Telex,
            Payload::Progress(_) => MessageType::Progress,
            Payload::Peek => MessageType::Peek,
            Payload::Poll => MessageType::Poll,
            Payload::Ping(_) => MessageType::Ping,
            Payload::Adsc(_) => MessageType::AdsC,
            Payload::Cpdlc(_) => MessageType::Cpdlc,
        }
    }
}

/// A typed protocol message: sender, recipient and variant payload.
///
/// # Examples
///
/// ```
/// use hoppie_codec::{Message, StationName};
///
/// let from: StationName = "DLH123".parse().unwrap();
/// let to: StationName = "OPS".parse().unwrap();
/// let msg = Message::telex(from, to, "Request gate info").unwrap();
///
/// let envelope = msg.envelope();
/// assert_eq!(envelope.packet, "REQUEST GATE INFO");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    from: StationName,
    to: StationName,
    payload: Payload,
}

impl Message {
    /// Create a free-text telex message.
    ///
    /// # Errors
    ///
    /// See [`TelexPayload::new`].
    pub fn telex(from: StationName, to: StationName, message: &str) -> Result<Self, ValidationError> {
        Ok(Self { from, to, payload: Payload::Telex(TelexPayload::new(message)?) })
    }

    /// Create an OOOI progress message from an already-validated payload.
    pub fn progress(from: StationName, to: StationName, payload: ProgressPayload) -> Self {
        Self { from, to, payload: Payload::Progress(payload) }
    }

    /// Create a peek request. Peek retrieves pending messages without
    /// appearing online and without marking them as relayed; the recipient
    /// is always the server.
    pub fn peek(from: StationName) -> Self {
        Self { from, to: StationName::server(), payload: Payload::Peek }
    }

    /// Create a poll request. Poll retrieves unread messages, marks them as
    /// relayed and makes the sender appear online; the recipient is always
    /// the server.
    pub fn poll(from: StationName) -> Self {
        Self { from, to: StationName::server(), payload: Payload::Poll }
    }

    /// Create a station presence query; the recipient is always the server.
    ///
    /// # Errors
    ///
    /// An explicit station list may name at most 24 stations.
    pub fn ping(from: StationName, stations: PingStations) -> Result<Self, ValidationError> {
        if let PingStations::List(list) = &stations {
            if list.len() > PING_MAX_STATIONS {
                return Err(ValidationError::TooManyStations {
                    count: list.len(),
                    limit: PING_MAX_STATIONS,
                });
            }
        }
        Ok(Self { from, to: StationName::server(), payload: Payload::Ping(stations) })
    }

    /// Create an ADS-C message.
    pub fn adsc(from: StationName, to: StationName, payload: AdscPayload) -> Self {
        Self { from, to, payload: Payload::Adsc(payload) }
    }

    /// Create a CPDLC message.
    pub fn cpdlc(from: StationName, to: StationName, payload: CpdlcPayload) -> Self {
        Self { from, to, payload: Payload::Cpdlc(payload) }
    }

    /// Return the sender station.
    pub fn from_station(&self) -> &StationName {
        &self.from
    }

    /// Return the recipient station.
    pub fn to_station(&self) -> &StationName {
        &self.to
    }

    /// Return the variant payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Return the message type tag.
    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    /// Encode the packet body for this message.
    #[must_use]
    pub fn packet(&self) -> String {
        match &self.payload {
            Payload::Telex(telex) => telex.packet(),
            Payload::Progress(progress) => progress.packet(),
            Payload::Peek | Payload::Poll => String::new(),
            Payload::Ping(stations) => stations.packet(),
            Payload::Adsc(adsc) => adsc.packet(),
            Payload::Cpdlc(cpdlc) => cpdlc.packet(),
        }
    }

    /// Flatten this message into the transport envelope.
    #[must_use]
    pub fn envelope(&self) -> MessageEnvelope {
        MessageEnvelope {
            from: self.from.clone(),
            to: self.to.clone(),
            msg_type: self.message_type(),
            packet: self.packet(),
        }
    }

    /// Decode a received packet into a typed message.
    ///
    /// Only types that travel as packets are decodable; poll, peek and ping
    /// are request-only and yield [`ParseError::UnsupportedMessageType`].
    ///
    /// # Errors
    ///
    /// Grammar violations of the selected variant decoder, or an
    /// unsupported message type.
    pub fn from_packet(
        from: StationName,
        to: StationName,
        msg_type: MessageType,
        packet: &str,
    ) -> Result<Self, ParseError> {
        let payload = match msg_type {
            MessageType::Telex => Payload::Telex(TelexPayload::from_packet(packet)?),
            MessageType::Cpdlc => Payload::Cpdlc(CpdlcPayload::from_packet(packet)?),
            MessageType::Progress => Payload::Progress(ProgressPayload::from_packet(packet)?),
            MessageType::AdsC => Payload::Adsc(AdscPayload::from_packet(packet)?),
            other @ (MessageType::Poll | MessageType::Peek | MessageType::Ping) => {
                return Err(ParseError::UnsupportedMessageType { value: other.to_string() })
            }
        };
        Ok(Self { from, to, payload })
    }

    /// Decode a received envelope into a typed message.
    ///
    /// # Errors
    ///
    /// See [`Message::from_packet`].
    pub fn from_envelope(envelope: &MessageEnvelope) -> Result<Self, ParseError> {
        Self::from_packet(
            envelope.from.clone(),
            envelope.to.clone(),
            envelope.msg_type,
            &envelope.packet,
        )
    }

    /// Decode a response item addressed to `to` into a typed message.
    ///
    /// The item's type token is trimmed and resolved against the closed
    /// [`MessageType`] set before dispatching to the variant decoder.
    ///
    /// # Errors
    ///
    /// An unknown type token, an invalid sender station name, or a
    /// malformed packet body.
    pub fn from_response_item(item: &ResponseItem, to: &StationName) -> Result<Self, ParseError> {
        let msg_type = MessageType::from_str(item.type_name.trim()).map_err(|_| {
            ParseError::UnsupportedMessageType { value: item.type_name.clone() }
        })?;
        let from = StationName::from_str(&item.from)?;
        Self::from_packet(from, to.clone(), msg_type, &item.packet)
    }
}

// ---------------------------------------------------------------------------
// MessageEnvelope
// ---------------------------------------------------------------------------

/// The flattened `{from, to, type, packet}` tuple exchanged with the
/// transport layer. Serialises with the wire field names, so it can be fed
/// directly into the connect call's form parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageEnvelope {
    /// Sender station name.
    pub from: StationName,
    /// Recipient station name.
    pub to: StationName,
    /// Message type tag.
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    /// Encoded packet body.
    pub packet: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpdlc::ResponseRequirement;

    fn station(name: &str) -> StationName {
        name.parse().unwrap()
    }

    #[test]
    fn message_type_wire_spelling() {
        assert_eq!(MessageType::AdsC.to_string(), "ads-c");
        assert_eq!(MessageType::Progress.to_string(), "progress");
        assert_eq!(MessageType::Cpdlc.to_string(), "cpdlc");
        assert_eq!("ads-c".parse::<MessageType>().unwrap(), MessageType::AdsC);
        assert_eq!("telex".parse::<MessageType>().unwrap(), MessageType::Telex);
        assert!("fax".parse::<MessageType>().is_err());
        for msg_type in <MessageType as strum::IntoEnumIterator>::iter() {
            assert_eq!(msg_type.to_string().parse::<MessageType>().unwrap(), msg_type);
        }
    }

    #[test]
    fn message_type_serde_uses_wire_spelling() {
        let json = serde_json::to_string(&MessageType::AdsC).unwrap();
        assert_eq!(json, "\"ads-c\"");
    }

    #[test]
    fn telex_packet_is_uppercased() {
        let msg = Message::telex(station("DLH123"), station("OPS"), "Request gate info").unwrap();
        assert_eq!(msg.packet(), "REQUEST GATE INFO");
        assert_eq!(msg.message_type(), MessageType::Telex);
    }

    #[test]
    fn telex_roundtrips_from_mixed_case_input() {
        let msg = Message::telex(station("DLH123"), station("OPS"), "Request gate info").unwrap();
        let back = Message::from_packet(
            station("DLH123"),
            station("OPS"),
            MessageType::Telex,
            &msg.packet(),
        )
        .unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn telex_rejects_too_long() {
        let text = "A".repeat(221);
        assert!(Message::telex(station("DLH123"), station("OPS"), &text).is_err());
        let text = "A".repeat(220);
        assert!(Message::telex(station("DLH123"), station("OPS"), &text).is_ok());
    }

    #[test]
    fn telex_rejects_non_ascii() {
        assert!(Message::telex(station("DLH123"), station("OPS"), "héllo").is_err());
    }

    #[test]
    fn peek_and_poll_address_the_server() {
        let peek = Message::peek(station("DLH123"));
        assert_eq!(peek.to_station(), &StationName::server());
        assert_eq!(peek.packet(), "");
        assert_eq!(peek.message_type(), MessageType::Peek);

        let poll = Message::poll(station("DLH123"));
        assert_eq!(poll.to_station(), &StationName::server());
        assert_eq!(poll.message_type(), MessageType::Poll);
    }

    #[test]
    fn ping_packet_variants() {
        let empty = Message::ping(station("DLH123"), PingStations::List(vec![])).unwrap();
        assert_eq!(empty.packet(), "");

        let all = Message::ping(station("DLH123"), PingStations::All).unwrap();
        assert_eq!(all.packet(), "ALL-CALLSIGNS");

        let list = Message::ping(
            station("DLH123"),
            PingStations::List(vec![station("OPS"), station("EDDM")]),
        )
        .unwrap();
        assert_eq!(list.packet(), "OPS EDDM");
        assert_eq!(list.to_station(), &StationName::server());
    }

    #[test]
    fn ping_rejects_too_many_stations() {
        let stations: Vec<StationName> = (0..25).map(|i| station(&format!("STN{i:02}"))).collect();
        let err = Message::ping(station("DLH123"), PingStations::List(stations)).unwrap_err();
        assert_eq!(err, ValidationError::TooManyStations { count: 25, limit: 24 });
    }

    #[test]
    fn envelope_is_derived_from_payload() {
        let msg = Message::cpdlc(
            station("DLH123"),
            station("EDDM"),
            CpdlcPayload::new(1, None, ResponseRequirement::WilcoUnable, "CLIMB TO FL350").unwrap(),
        );
        let envelope = msg.envelope();
        assert_eq!(envelope.from, station("DLH123"));
        assert_eq!(envelope.to, station("EDDM"));
        assert_eq!(envelope.msg_type, MessageType::Cpdlc);
        assert_eq!(envelope.packet, "/data2/1//WU/CLIMB TO FL350");
    }

    #[test]
    fn envelope_serialises_with_wire_field_names() {
        let msg = Message::telex(station("DLH123"), station("OPS"), "HELLO").unwrap();
        let json = serde_json::to_value(msg.envelope()).unwrap();
        assert_eq!(json["from"], "DLH123");
        assert_eq!(json["to"], "OPS");
        assert_eq!(json["type"], "telex");
        assert_eq!(json["packet"], "HELLO");
    }

    #[test]
    fn dispatch_telex() {
        let msg =
            Message::from_packet(station("OPS"), station("DLH123"), MessageType::Telex, "MSG")
                .unwrap();
        assert!(matches!(msg.payload(), Payload::Telex(_)));
    }

    #[test]
    fn dispatch_request_only_types_rejected() {
        for msg_type in [MessageType::Poll, MessageType::Peek, MessageType::Ping] {
            let err = Message::from_packet(station("OPS"), station("DLH123"), msg_type, "")
                .unwrap_err();
            assert!(matches!(err, ParseError::UnsupportedMessageType { .. }), "{msg_type}");
        }
    }

    #[test]
    fn envelope_roundtrip_through_dispatch() {
        let msg = Message::from_packet(
            station("ATC1"),
            station("DLH123"),
            MessageType::AdsC,
            "REQUEST PERIODIC 120",
        )
        .unwrap();
        let reparsed = Message::from_envelope(&msg.envelope()).unwrap();
        assert_eq!(reparsed, msg);
    }

    #[test]
    fn from_response_item_dispatches_on_trimmed_type() {
        let item = ResponseItem {
            id: Some(12),
            from: "OPS".to_string(),
            type_name: "telex".to_string(),
            packet: "MSG".to_string(),
        };
        let msg = Message::from_response_item(&item, &station("DLH123")).unwrap();
        assert_eq!(msg.from_station(), &station("OPS"));
        assert_eq!(msg.packet(), "MSG");
    }

    #[test]
    fn from_response_item_rejects_unknown_type() {
        let item = ResponseItem {
            id: None,
            from: "OPS".to_string(),
            type_name: "facsimile".to_string(),
            packet: "MSG".to_string(),
        };
        let err = Message::from_response_item(&item, &station("DLH123")).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedMessageType { .. }));
    }

    #[test]
    fn message_serde_roundtrip() {
        let msg = Message::telex(station("DLH123"), station("OPS"), "HELLO").unwrap();
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
