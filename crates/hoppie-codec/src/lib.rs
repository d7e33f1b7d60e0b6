#![deny(missing_docs)]

//! # Hoppie Codec
//!
//! Encoding and decoding for the Hoppie ACARS network's line-oriented text
//! protocol: typed message construction, packet rendering, and parsing of
//! server responses.
//!
//! ## Message hierarchy
//!
//! ```text
//! Message { from, to, payload }
//! └── Payload
//!     ├── Telex(TelexPayload)
//!     ├── Progress(ProgressPayload)
//!     ├── Peek / Poll
//!     ├── Ping(PingStations)
//!     ├── Adsc(AdscPayload)
//!     │   ├── PeriodicContractRequest / ContractCancellation
//!     │   ├── PeriodicContractCancellation / ContractRejection
//!     │   └── PeriodicReport(AdscData)
//!     └── Cpdlc(CpdlcPayload)
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`station`] | Validated identifiers (`StationName`, `IcaoAirportCode`) |
//! | [`message`] | `Message`, `Payload`, `MessageEnvelope`, packet dispatch |
//! | [`progress`] | OOOI progress reports and `TimeOfDay` |
//! | [`adsc`] | ADS-C contract management and periodic reports |
//! | [`cpdlc`] | CPDLC `data2` exchange payloads |
//! | [`response`] | `ok`/`error` server response parsing |
//! | [`error`] | `ValidationError` and `ParseError` |
//! | [`util`] | Fixed-width numeric field formatting |

pub mod adsc;
pub mod cpdlc;
pub mod error;
pub mod message;
pub mod progress;
pub mod response;
pub mod station;
pub mod util;

// Re-export all public types at crate root for convenience.
// Downstream crates can use `hoppie_codec::Message` directly.
pub use adsc::*;
pub use cpdlc::*;
pub use error::*;
pub use message::*;
pub use progress::*;
pub use response::*;
pub use station::*;
