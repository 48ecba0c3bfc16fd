// src/types.rs
use serde::{Deserialize, Serialize};

use crate::message::NdefMessage;
use crate::record::NdefRecord;
use crate::rtd;

// Flag byte layout: MB | ME | CF | SR | IL | TNF(3)
pub const FLAG_MESSAGE_BEGIN: u8 = 0x80;
pub const FLAG_MESSAGE_END: u8 = 0x40;
pub const FLAG_CHUNKED: u8 = 0x20;
pub const FLAG_SHORT: u8 = 0x10;
pub const FLAG_ID: u8 = 0x08;
pub const TNF_MASK: u8 = 0x07;

// Record Type Definitions
pub const RTD_TEXT: &[u8] = b"T";
pub const RTD_URI: &[u8] = b"U";
pub const RTD_SMART_POSTER: &[u8] = b"Sp";
pub const RTD_ACTION: &[u8] = b"act";

/// Largest payload that still fits a short record's 1-byte length.
pub const SHORT_PAYLOAD_MAX: usize = 255;

/// Type Name Format: how a record's type field is to be interpreted.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tnf {
    Empty = 0x00,
    WellKnown = 0x01,
    MediaType = 0x02,
    AbsoluteUri = 0x03,
    External = 0x04,
    Unknown = 0x05,
    Unchanged = 0x06,
    Reserved = 0x07,
}

impl Tnf {
    /// Only the low 3 bits are looked at, so every byte maps to a TNF.
    pub fn from_bits(raw: u8) -> Self {
        match raw & TNF_MASK {
            0x00 => Tnf::Empty,
            0x01 => Tnf::WellKnown,
            0x02 => Tnf::MediaType,
            0x03 => Tnf::AbsoluteUri,
            0x04 => Tnf::External,
            0x05 => Tnf::Unknown,
            0x06 => Tnf::Unchanged,
            _ => Tnf::Reserved,
        }
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecordFlags {
    pub message_begin: bool,
    pub message_end: bool,
    pub chunked: bool,
    pub short: bool,
    pub id: bool,
}

impl RecordFlags {
    pub fn from_raw(raw: u8) -> Self {
        Self {
            message_begin: raw & FLAG_MESSAGE_BEGIN != 0,
            message_end: raw & FLAG_MESSAGE_END != 0,
            chunked: raw & FLAG_CHUNKED != 0,
            short: raw & FLAG_SHORT != 0,
            id: raw & FLAG_ID != 0,
        }
    }

    /// Flag bits only; the TNF is OR-ed in by the record encoder.
    pub fn to_raw(self) -> u8 {
        let mut raw = 0;
        if self.message_begin {
            raw |= FLAG_MESSAGE_BEGIN;
        }
        if self.message_end {
            raw |= FLAG_MESSAGE_END;
        }
        if self.chunked {
            raw |= FLAG_CHUNKED;
        }
        if self.short {
            raw |= FLAG_SHORT;
        }
        if self.id {
            raw |= FLAG_ID;
        }
        raw
    }
}

// JSON views handed to the CLI (byte strings are hex encoded)
#[derive(Serialize, Clone, Debug)]
pub struct RecordView {
    pub tnf: Tnf,
    pub flags: RecordFlags,
    #[serde(rename = "type")]
    pub record_type: String,
    pub id: String,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<RecordView>>,
}

#[derive(Serialize, Clone, Debug)]
pub struct MessageView {
    pub length: usize,
    pub records: Vec<RecordView>,
}

impl From<&NdefRecord> for RecordView {
    fn from(record: &NdefRecord) -> Self {
        let mut view = RecordView {
            tnf: record.tnf(),
            flags: record.flags(),
            record_type: hex::encode(record.record_type()),
            id: hex::encode(record.id()),
            payload: hex::encode(record.payload()),
            language: None,
            text: None,
            uri: None,
            records: None,
        };

        if record.tnf() != Tnf::WellKnown {
            return view;
        }
        match record.record_type() {
            RTD_TEXT => {
                if let Ok(text) = rtd::TextRecord::parse(record.payload()) {
                    view.language = Some(text.language);
                    view.text = Some(text.text);
                }
            }
            RTD_URI => view.uri = rtd::expand_uri(record.payload()).ok(),
            RTD_SMART_POSTER => {
                // Already verified on decode; a failure here just drops the nested view.
                view.records = NdefMessage::from_bytes(record.payload())
                    .ok()
                    .map(|inner| inner.records().iter().map(RecordView::from).collect());
            }
            _ => {}
        }
        view
    }
}

impl From<&NdefMessage> for MessageView {
    fn from(message: &NdefMessage) -> Self {
        MessageView {
            length: message.encoded_len(),
            records: message.records().iter().map(RecordView::from).collect(),
        }
    }
}
