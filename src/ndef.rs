// src/ndef.rs
//! Convenience builders on top of the codec, plus the TLV container a
//! message is stored in on a tag.
use log::debug;

use crate::buffer::BufferReader;
use crate::config::VerifyConfig;
use crate::error::{NdefError, Result};
use crate::message::{NdefMessage, new_message};
use crate::rtd::abbreviate_uri;
use crate::types::{RTD_ACTION, RTD_SMART_POSTER, RTD_TEXT, RTD_URI, Tnf};

// Type 2 tag TLV blocks
pub const TLV_NULL: u8 = 0x00;
pub const TLV_NDEF_MESSAGE: u8 = 0x03;
pub const TLV_TERMINATOR: u8 = 0xFE;
/// Marks a 3-byte length field (0xFF + 2-byte big-endian length).
pub const TLV_LONG_LENGTH: u8 = 0xFF;

const SMART_POSTER_ACTION_DO: u8 = 0x00;
const DEFAULT_LANGUAGE: &str = "en";
const NO_ID: &[u8] = &[];

/// Text record payload: [Status Byte] + [Lang Code] + [UTF-8 Text]
pub fn text_payload(language: &str, text: &str) -> Result<Vec<u8>> {
    if !language.is_ascii() {
        return Err(NdefError::LanguageCodeEncodingInvalid);
    }
    let lang_len = language.len();
    if lang_len > 0x1f {
        return Err(NdefError::ValueOutOfRange {
            value: lang_len as u64,
            bits: 5,
        });
    }

    let mut payload = Vec::with_capacity(1 + lang_len + text.len());
    // Bit 7=0 (UTF-8), bits 4-0 = lang length
    payload.push(lang_len as u8);
    payload.extend_from_slice(language.as_bytes());
    payload.extend_from_slice(text.as_bytes());
    Ok(payload)
}

pub fn new_text_message(language: &str, text: &str) -> Result<NdefMessage> {
    new_message([(Tnf::WellKnown, RTD_TEXT, NO_ID, text_payload(language, text)?)])
}

pub fn new_uri_message(url: &str) -> Result<NdefMessage> {
    new_message([(Tnf::WellKnown, RTD_URI, NO_ID, abbreviate_uri(url))])
}

/// Smart poster: URI + "do" action + optional English title, nested in an `Sp` record.
pub fn new_smart_poster(title: &str, url: &str) -> Result<NdefMessage> {
    let mut records = vec![
        (Tnf::WellKnown, RTD_URI, NO_ID, abbreviate_uri(url)),
        (Tnf::WellKnown, RTD_ACTION, NO_ID, vec![SMART_POSTER_ACTION_DO]),
    ];
    if !title.is_empty() {
        records.push((
            Tnf::WellKnown,
            RTD_TEXT,
            NO_ID,
            text_payload(DEFAULT_LANGUAGE, title)?,
        ));
    }

    let inner = new_message(records)?.to_bytes()?;
    debug!("smart poster inner message: {} bytes", inner.len());
    new_message([(Tnf::WellKnown, RTD_SMART_POSTER, NO_ID, inner)])
}

/// Wraps an encoded message in an NDEF Message TLV followed by a terminator TLV.
pub fn wrap_in_tlv(ndef_bytes: &[u8]) -> Result<Vec<u8>> {
    let len = ndef_bytes.len();
    let mut tlv = Vec::with_capacity(len + 5);
    tlv.push(TLV_NDEF_MESSAGE);

    if len < usize::from(TLV_LONG_LENGTH) {
        tlv.push(len as u8);
    } else {
        let long = u16::try_from(len).map_err(|_| NdefError::ValueOutOfRange {
            value: len as u64,
            bits: 16,
        })?;
        tlv.push(TLV_LONG_LENGTH);
        tlv.extend_from_slice(&long.to_be_bytes());
    }

    tlv.extend_from_slice(ndef_bytes);
    tlv.push(TLV_TERMINATOR);
    Ok(tlv)
}

fn read_tlv_length(r: &mut BufferReader<'_>) -> Result<usize> {
    let first = r.read_u8()?;
    if first != TLV_LONG_LENGTH {
        return Ok(usize::from(first));
    }
    let bytes = r.read_bytes(2)?;
    Ok(usize::from(u16::from_be_bytes([bytes[0], bytes[1]])))
}

/// Finds the first NDEF Message TLV in a tag memory dump and returns its value.
///
/// NULL TLVs are skipped, other TLVs (lock/memory control, proprietary)
/// are stepped over by their length.
pub fn unwrap_tlv(buffer: &[u8]) -> Result<&[u8]> {
    let mut r = BufferReader::new(buffer);
    while !r.eob() {
        let tag = r.read_u8()?;
        match tag {
            TLV_NULL => continue,
            TLV_TERMINATOR => break,
            TLV_NDEF_MESSAGE => {
                let len = read_tlv_length(&mut r)?;
                if len > r.remaining() {
                    return Err(NdefError::invalid_tlv(format!(
                        "length {len} exceeds the {} bytes left",
                        r.remaining()
                    )));
                }
                return r.read_bytes(len);
            }
            other => {
                let len = read_tlv_length(&mut r)?;
                debug!("skipping TLV {other:#04x} ({len} bytes)");
                r.read_bytes(len)?;
            }
        }
    }
    Err(NdefError::invalid_tlv("no NDEF message TLV found"))
}

/// Decodes the message stored in a tag memory dump.
pub fn decode_tag_message(buffer: &[u8], config: &VerifyConfig) -> Result<NdefMessage> {
    NdefMessage::from_bytes_with(unwrap_tlv(buffer)?, config)
}
