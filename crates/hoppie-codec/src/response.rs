//! Server response envelope parsing.
//!
//! Every transport call answers with a line starting in `ok` or `error`.
//! The content after an `ok` depends on the request type: poll and peek
//! answer with brace-delimited message items, ping with a station list,
//! everything else with opaque plain text. An `error` carries a
//! brace-delimited reason.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::message::MessageType;
use crate::station::StationName;

// ---------------------------------------------------------------------------
// ResponseCode
// ---------------------------------------------------------------------------

/// The leading status word of a server response line.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseCode {
    /// The request was accepted.
    Ok,
    /// The request was rejected.
    Error,
}

// ---------------------------------------------------------------------------
// ResponseItem
// ---------------------------------------------------------------------------

/// One brace-delimited message item from a poll or peek response:
/// `{[ID ]FROM TYPE {PACKET}}`.
///
/// The item is carried verbatim; resolve it into a typed message with
/// [`Message::from_response_item`](crate::Message::from_response_item).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResponseItem {
    /// Numeric message id. Present in peek responses, absent in poll.
    pub id: Option<u64>,
    /// Sender station name token.
    pub from: String,
    /// Message type token, as spelled by the server.
    #[serde(rename = "type")]
    pub type_name: String,
    /// The raw packet body between the inner braces.
    pub packet: String,
}

// ---------------------------------------------------------------------------
// Response / SuccessPayload
// ---------------------------------------------------------------------------

/// A parsed server response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The server accepted the request.
    Ok(SuccessPayload),
    /// The server rejected the request with a reason.
    Error {
        /// Reason text between the outermost braces.
        reason: String,
    },
}

impl Response {
    /// Return the status word this response was parsed from.
    pub fn code(&self) -> ResponseCode {
        match self {
            Response::Ok(_) => ResponseCode::Ok,
            Response::Error { .. } => ResponseCode::Error,
        }
    }
}

/// The content of a successful response, shaped by the request type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum SuccessPayload {
    /// Opaque content (may be empty).
    Plain(String),
    /// Message items from a poll or peek request.
    Items(Vec<ResponseItem>),
    /// Online station names from a ping request.
    Stations(Vec<String>),
}

/// How to interpret the content of a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseFlavor {
    Plain,
    Items,
    Stations,
}

impl ResponseFlavor {
    fn for_request(request_type: MessageType) -> Self {
        match request_type {
            MessageType::Poll | MessageType::Peek => ResponseFlavor::Items,
            MessageType::Ping => ResponseFlavor::Stations,
            _ => ResponseFlavor::Plain,
        }
    }
}

// ---------------------------------------------------------------------------
// parse_response
// ---------------------------------------------------------------------------

/// Parse a raw server response line in the context of the request that
/// produced it.
///
/// # Errors
///
/// A response not starting with `ok` or `error`, or an `error` response
/// with no brace-delimited reason.
pub fn parse_response(text: &str, request_type: MessageType) -> Result<Response, ParseError> {
    if let Some(rest) = text.strip_prefix("ok") {
        let content = rest.trim();
        let payload = match ResponseFlavor::for_request(request_type) {
            ResponseFlavor::Plain => SuccessPayload::Plain(content.to_string()),
            ResponseFlavor::Items => SuccessPayload::Items(parse_items(content)),
            ResponseFlavor::Stations => SuccessPayload::Stations(parse_stations(content)),
        };
        Ok(Response::Ok(payload))
    } else if let Some(rest) = text.strip_prefix("error") {
        Ok(Response::Error { reason: extract_reason(rest)? })
    } else {
        Err(ParseError::MalformedResponse {
            reason: "response does not start with ok or error".to_string(),
        })
    }
}

/// Extract the error reason between the first `{` and the last `}`.
/// Anything outside the braces is discarded.
fn extract_reason(rest: &str) -> Result<String, ParseError> {
    let start = rest.find('{');
    let end = rest.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(rest[s + 1..e].to_string()),
        _ => Err(ParseError::MalformedResponse {
            reason: "error response without a braced reason".to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Item scanning
// ---------------------------------------------------------------------------

/// Scan the content of a poll/peek response for message items. Malformed
/// items are logged and skipped; scanning resumes at the next brace so one
/// bad item does not discard the rest of the batch.
fn parse_items(content: &str) -> Vec<ResponseItem> {
    let mut items = Vec::new();
    let mut pos = 0;
    while let Some(open) = content[pos..].find('{') {
        let start = pos + open;
        match parse_item(&content[start..]) {
            Some((item, consumed)) => {
                items.push(item);
                pos = start + consumed;
            }
            None => {
                // Truncate by characters, not bytes: the garbage may be
                // arbitrary UTF-8 and a byte slice could split a code point.
                let snippet: String = content[start..].chars().take(40).collect();
                tracing::warn!(offset = start, "skipping malformed response item: {snippet}");
                pos = start + 1;
            }
        }
    }
    items
}

/// Parse one `{[ID ]FROM TYPE {PACKET}}` item at the start of `s`.
/// Returns the item and the number of bytes consumed, or `None` when the
/// text does not form a complete item.
fn parse_item(s: &str) -> Option<(ResponseItem, usize)> {
    let body = s.strip_prefix('{')?;
    let inner_open = body.find('{')?;
    let head = &body[..inner_open];
    let after_open = &body[inner_open + 1..];
    let packet_end = after_open.find('}')?;
    let packet = &after_open[..packet_end];
    let tail = &after_open[packet_end + 1..];
    let tail = tail.strip_prefix('}')?;

    let tokens: Vec<&str> = head.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }

    // A leading all-digit token followed by a station-shaped token is a
    // message id; otherwise the first token is the sender.
    let (id, rest) = if tokens.len() >= 3
        && tokens[0].bytes().all(|b| b.is_ascii_digit())
        && StationName::is_shaped(tokens[1])
    {
        (Some(tokens[0].parse().ok()?), &tokens[1..])
    } else {
        (None, &tokens[..])
    };

    let from = rest[0];
    if !StationName::is_shaped(from) {
        return None;
    }
    let type_tokens = &rest[1..];
    if type_tokens.is_empty()
        || !type_tokens
            .iter()
            .all(|t| t.bytes().all(|b| b.is_ascii_lowercase() || b == b'-'))
    {
        return None;
    }

    let item = ResponseItem {
        id,
        from: from.to_string(),
        type_name: type_tokens.join(" "),
        packet: packet.to_string(),
    };
    let consumed = s.len() - tail.len();
    Some((item, consumed))
}

// ---------------------------------------------------------------------------
// Station scanning
// ---------------------------------------------------------------------------

/// Extract station names from a ping response: maximal runs of uppercase
/// ASCII alphanumerics, keeping those of plausible station length.
fn parse_stations(content: &str) -> Vec<String> {
    content
        .split(|c: char| !c.is_ascii_uppercase() && !c.is_ascii_digit())
        .filter(|run| {
            if run.is_empty() {
                return false;
            }
            if (3..=8).contains(&run.len()) {
                true
            } else {
                tracing::warn!("discarding implausible station token: {run}");
                false
            }
        })
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn response_code_wire_spelling() {
        assert_eq!(ResponseCode::Ok.to_string(), "ok");
        assert_eq!(ResponseCode::Error.to_string(), "error");
        for code in ResponseCode::iter() {
            assert_eq!(code.to_string().parse::<ResponseCode>().unwrap(), code);
        }
    }

    #[test]
    fn parsed_response_exposes_its_code() {
        let ok = parse_response("ok", MessageType::Telex).unwrap();
        assert_eq!(ok.code(), ResponseCode::Ok);
        let error = parse_response("error {reason}", MessageType::Telex).unwrap();
        assert_eq!(error.code(), ResponseCode::Error);
    }

    #[test]
    fn ok_plain_response() {
        let response = parse_response("ok", MessageType::Telex).unwrap();
        assert_eq!(response, Response::Ok(SuccessPayload::Plain(String::new())));
    }

    #[test]
    fn ok_plain_response_keeps_content() {
        let response = parse_response("ok 12345", MessageType::Telex).unwrap();
        assert_eq!(response, Response::Ok(SuccessPayload::Plain("12345".to_string())));
    }

    #[test]
    fn error_response_extracts_braced_reason() {
        let response = parse_response("error {invalid logon code}", MessageType::Telex).unwrap();
        assert_eq!(response, Response::Error { reason: "invalid logon code".to_string() });
    }

    #[test]
    fn error_reason_spans_first_to_last_brace() {
        let response = parse_response("error garbage {outer {inner} tail} junk", MessageType::Telex)
            .unwrap();
        assert_eq!(response, Response::Error { reason: "outer {inner} tail".to_string() });
    }

    #[test]
    fn error_without_braces_is_malformed() {
        assert!(parse_response("error no reason here", MessageType::Telex).is_err());
    }

    #[test]
    fn unknown_status_word_is_malformed() {
        assert!(parse_response("maybe {later}", MessageType::Telex).is_err());
    }

    #[test]
    fn poll_response_single_item() {
        let response = parse_response("ok {OPS telex {MSG}}", MessageType::Poll).unwrap();
        let Response::Ok(SuccessPayload::Items(items)) = response else {
            panic!("expected items");
        };
        assert_eq!(
            items,
            vec![ResponseItem {
                id: None,
                from: "OPS".to_string(),
                type_name: "telex".to_string(),
                packet: "MSG".to_string(),
            }]
        );
    }

    #[test]
    fn peek_response_item_with_id() {
        let response = parse_response("ok {12 OPS telex {MSG}}", MessageType::Peek).unwrap();
        let Response::Ok(SuccessPayload::Items(items)) = response else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, Some(12));
        assert_eq!(items[0].from, "OPS");
    }

    #[test]
    fn poll_response_multiple_items() {
        let text = "ok {OPS telex {MSG A}} {ATC1 cpdlc {/data2/1//N/WILCO}}";
        let response = parse_response(text, MessageType::Poll).unwrap();
        let Response::Ok(SuccessPayload::Items(items)) = response else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].type_name, "telex");
        assert_eq!(items[1].type_name, "cpdlc");
        assert_eq!(items[1].packet, "/data2/1//N/WILCO");
    }

    #[test]
    fn item_type_may_span_tokens() {
        let response = parse_response("ok {OPS ads-c {REQUEST CANCEL}}", MessageType::Poll)
            .unwrap();
        let Response::Ok(SuccessPayload::Items(items)) = response else {
            panic!("expected items");
        };
        assert_eq!(items[0].type_name, "ads-c");
    }

    #[test]
    fn malformed_item_is_skipped_not_fatal() {
        let text = "ok {OPS telex {FIRST}} {broken! item} {EDDM telex {LAST}}";
        let response = parse_response(text, MessageType::Poll).unwrap();
        let Response::Ok(SuccessPayload::Items(items)) = response else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].packet, "FIRST");
        assert_eq!(items[1].packet, "LAST");
    }

    #[test]
    fn skip_of_multibyte_garbage_is_not_fatal() {
        // The skip warning truncates the offending text; a code point
        // straddling the truncation window must not break the batch.
        let garbage = format!("{{{}é oops}}", "a".repeat(38));
        let text = format!("ok {garbage} {{OPS telex {{MSG}}}}");
        let response = parse_response(&text, MessageType::Poll).unwrap();
        let Response::Ok(SuccessPayload::Items(items)) = response else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].packet, "MSG");
    }

    #[test]
    fn skipped_item_between_id_bearing_items() {
        let text = "ok {1 OPS telex {MSG}} {invalid} {3 OPS telex {MSG}}";
        let response = parse_response(text, MessageType::Peek).unwrap();
        let Response::Ok(SuccessPayload::Items(items)) = response else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, Some(1));
        assert_eq!(items[1].id, Some(3));
    }

    #[test]
    fn item_without_head_tokens_is_skipped() {
        let response = parse_response("ok {{MSG}}", MessageType::Poll).unwrap();
        assert_eq!(response, Response::Ok(SuccessPayload::Items(vec![])));
    }

    #[test]
    fn empty_poll_response_yields_no_items() {
        let response = parse_response("ok", MessageType::Poll).unwrap();
        assert_eq!(response, Response::Ok(SuccessPayload::Items(vec![])));
    }

    #[test]
    fn ping_response_station_list() {
        let response = parse_response("ok {DLH123 EDDM OPS}", MessageType::Ping).unwrap();
        assert_eq!(
            response,
            Response::Ok(SuccessPayload::Stations(vec![
                "DLH123".to_string(),
                "EDDM".to_string(),
                "OPS".to_string(),
            ]))
        );
    }

    #[test]
    fn ping_response_empty() {
        let response = parse_response("ok {}", MessageType::Ping).unwrap();
        assert_eq!(response, Response::Ok(SuccessPayload::Stations(vec![])));
    }

    #[test]
    fn ping_response_discards_implausible_tokens() {
        let response = parse_response("ok {AB DLH123 TOOLONGNAME1}", MessageType::Ping).unwrap();
        assert_eq!(
            response,
            Response::Ok(SuccessPayload::Stations(vec!["DLH123".to_string()]))
        );
    }

    #[test]
    fn item_serde_uses_wire_field_name() {
        let item = ResponseItem {
            id: Some(3),
            from: "OPS".to_string(),
            type_name: "telex".to_string(),
            packet: "MSG".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "telex");
    }
}
