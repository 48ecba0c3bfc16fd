// src/rtd.rs
//! Well-known record types (TNF 0x01): Text, URI and Smart Poster.
//!
//! Validators are looked up by the record's type bytes; well-known types
//! without an entry pass through unvalidated.
use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;

use crate::config::VerifyContext;
use crate::error::{NdefError, Result};
use crate::message::NdefMessage;
use crate::types::{RTD_SMART_POSTER, RTD_TEXT, RTD_URI, Tnf};

pub const RTD_URI_ABBREVIATION_COUNT: usize = 35;

/// URI identifier codes 0x01..=0x23; code 0x00 means no prefix.
pub const URI_ABBREVIATIONS: [&str; RTD_URI_ABBREVIATION_COUNT] = [
    "http://www.",
    "https://www.",
    "http://",
    "https://",
    "tel:",
    "mailto:",
    "ftp://anonymous:anonymous@",
    "ftp://ftp.",
    "ftps://",
    "sftp://",
    "smb://",
    "nfs://",
    "ftp://",
    "dav://",
    "news:",
    "telnet://",
    "imap:",
    "rtsp://",
    "urn:",
    "pop:",
    "sip:",
    "sips:",
    "tftp:",
    "btspp://",
    "btl2cap://",
    "btgoep://",
    "tcpobex://",
    "irdaobex://",
    "file://",
    "urn:epc:id:",
    "urn:epc:tag:",
    "urn:epc:pat:",
    "urn:epc:raw:",
    "urn:epc:",
    "urn:nfc:",
];

const TEXT_STATUS_UTF16: u8 = 0x80;
const TEXT_STATUS_LANG_MASK: u8 = 0x1f;

pub(crate) type Validator = fn(&[u8], VerifyContext<'_>) -> Result<()>;

lazy_static! {
    static ref WELL_KNOWN_VALIDATORS: HashMap<&'static [u8], Validator> = {
        let mut m: HashMap<&'static [u8], Validator> = HashMap::new();
        m.insert(RTD_TEXT, verify_text);
        m.insert(RTD_URI, verify_uri);
        m.insert(RTD_SMART_POSTER, verify_smart_poster);
        m
    };
}

pub(crate) fn validator_for(record_type: &[u8]) -> Option<Validator> {
    WELL_KNOWN_VALIDATORS.get(record_type).copied()
}

/// Whether payloads of this well-known type are structurally checked.
pub fn is_validated(record_type: &[u8]) -> bool {
    WELL_KNOWN_VALIDATORS.contains_key(record_type)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16,
}

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16 => "utf-16",
        }
    }
}

/// Decoded RTD_TEXT payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRecord {
    pub encoding: TextEncoding,
    pub language: String,
    pub text: String,
}

impl TextRecord {
    /// Status byte: bit 7 selects UTF-16, bits 4-0 hold the language code length.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (&status, rest) = payload
            .split_first()
            .ok_or(NdefError::MissingStatusByte { rtd: "RTD_TEXT" })?;

        let encoding = if status & TEXT_STATUS_UTF16 != 0 {
            TextEncoding::Utf16
        } else {
            TextEncoding::Utf8
        };

        let lang_len = usize::from(status & TEXT_STATUS_LANG_MASK);
        if rest.len() < lang_len {
            return Err(NdefError::LanguageCodeLengthInvalid);
        }
        let (lang, body) = rest.split_at(lang_len);

        if !lang.is_ascii() {
            return Err(NdefError::LanguageCodeEncodingInvalid);
        }
        let language = String::from_utf8_lossy(lang).into_owned();

        let text = match encoding {
            TextEncoding::Utf8 => std::str::from_utf8(body).map(str::to_owned).ok(),
            TextEncoding::Utf16 => decode_utf16(body),
        }
        .ok_or(NdefError::TextEncodingInvalid {
            encoding: encoding.name(),
        })?;

        Ok(TextRecord {
            encoding,
            language,
            text,
        })
    }
}

/// UTF-16 honouring a leading BOM; big-endian when there is none.
fn decode_utf16(body: &[u8]) -> Option<String> {
    if body.len() % 2 != 0 {
        return None;
    }
    let (little_endian, body) = match body {
        [0xff, 0xfe, rest @ ..] => (true, rest),
        [0xfe, 0xff, rest @ ..] => (false, rest),
        _ => (false, body),
    };
    let units = body.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if little_endian {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        }
    });
    char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
}

fn verify_text(payload: &[u8], _ctx: VerifyContext<'_>) -> Result<()> {
    TextRecord::parse(payload).map(|_| ())
}

/// Splits a URI payload into its abbreviation prefix and the literal remainder.
fn split_uri(payload: &[u8]) -> Result<(&'static str, &str)> {
    let (&code, rest) = payload
        .split_first()
        .ok_or(NdefError::MissingStatusByte { rtd: "RTD_URI" })?;

    let prefix = match code {
        0 => "",
        c if usize::from(c) <= RTD_URI_ABBREVIATION_COUNT => URI_ABBREVIATIONS[usize::from(c) - 1],
        c => return Err(NdefError::UriAbbreviationCodeInvalid { code: c }),
    };

    let rest = std::str::from_utf8(rest).map_err(|_| NdefError::UriEncodingInvalid)?;
    Ok((prefix, rest))
}

fn verify_uri(payload: &[u8], _ctx: VerifyContext<'_>) -> Result<()> {
    split_uri(payload).map(|_| ())
}

/// Full URI held by an RTD_URI payload.
pub fn expand_uri(payload: &[u8]) -> Result<String> {
    let (prefix, rest) = split_uri(payload)?;
    Ok(format!("{prefix}{rest}"))
}

/// RTD_URI payload for `url`, using the first table prefix that matches.
pub fn abbreviate_uri(url: &str) -> Vec<u8> {
    let (code, rest) = URI_ABBREVIATIONS
        .iter()
        .enumerate()
        .find_map(|(i, prefix)| url.strip_prefix(prefix).map(|rest| (i + 1, rest)))
        .unwrap_or((0, url));

    let mut payload = Vec::with_capacity(1 + rest.len());
    // code <= 35 by construction
    payload.push(code as u8);
    payload.extend_from_slice(rest.as_bytes());
    payload
}

fn verify_smart_poster(payload: &[u8], ctx: VerifyContext<'_>) -> Result<()> {
    let ctx = ctx.nested()?;
    debug!("verifying smart poster at depth {} ({} bytes)", ctx.depth, payload.len());
    let inner = NdefMessage::parse(payload, ctx)?;
    let has_uri = inner
        .records()
        .iter()
        .any(|r| r.tnf() == Tnf::WellKnown && r.record_type() == RTD_URI);
    if !has_uri {
        return Err(NdefError::SmartPosterMissingUri);
    }
    Ok(())
}
