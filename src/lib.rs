//! # NDEF codec
//!
//! Parser, verifier and serializer for NFC Data Exchange Format messages.
//!
//! ## Guarantees
//! - A decoded `NdefMessage` has passed record-level checks (per TNF and
//!   for the Text/URI/Smart Poster well-known types) and message-level
//!   checks (MB/ME bracketing, chunk sequencing, first-record type)
//! - Smart poster payloads are decoded recursively up to a configurable depth
//! - Records own copies of their bytes; the input buffer is not retained
//!
//! ## Crate layout
//! - `buffer`: `BufferReader`/`BufferWriter` (little-endian primitives)
//! - `record`: single-record layout and TNF rules
//! - `message`: record sequencing, `new_message`
//! - `rtd`: well-known type validators and the URI abbreviation table
//! - `ndef`: text/URI/smart poster builders and tag TLV framing
//!
//! ## Quick start
//!
//! ```
//! use ndef_codec::{new_message, NdefMessage, Tnf};
//!
//! let msg = new_message([(Tnf::WellKnown, "T", "id", "\x02enhello world")]).unwrap();
//! let bytes = msg.to_bytes().unwrap();
//!
//! let back = NdefMessage::from_bytes(&bytes).unwrap();
//! assert_eq!(back.records()[0].id(), b"id");
//! assert_eq!(back, msg);
//! ```
//!
//! ## Rejecting malformed input
//!
//! ```
//! use ndef_codec::{NdefError, NdefMessage};
//!
//! // MB set, ME never set
//! let buf = [0x99, 0x01, 0x05, 0x01, 0x55, 0x61, 0x01, 0x23, 0x45, 0x67, 0x61];
//! assert_eq!(NdefMessage::from_bytes(&buf), Err(NdefError::MissingEndFlag));
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod message;
pub mod ndef;
pub mod record;
pub mod rtd;
pub mod types;

pub use buffer::{BufferReader, BufferWriter};
pub use config::VerifyConfig;
pub use error::{ErrorKind, NdefError, Result};
pub use message::{NdefMessage, new_message, new_message_with};
pub use ndef::{new_smart_poster, unwrap_tlv, wrap_in_tlv};
pub use record::NdefRecord;
pub use types::{RecordFlags, Tnf};
