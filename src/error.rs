// src/error.rs
use thiserror::Error;

/// Detection layer an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A read ran past the end of the buffer.
    Truncation,
    /// A record's own fields or its well-known payload are malformed.
    Record,
    /// Records are individually fine but do not form a valid message.
    Message,
    /// A value handed to the writer does not fit its field.
    EncodingInput,
    /// The tag container (TLV) around a message is malformed.
    Container,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NdefError {
    #[error("not enough bytes [offset={offset}, remaining={remaining}, need={needed}]")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: u64, bits: u32 },

    #[error("TNF is set to 'empty' but record not empty")]
    EmptyRecordNotEmpty,

    #[error("TNF is set to 'unknown' but type not empty")]
    UnknownRecordHasType,

    #[error("TNF is set to 'unchanged' but type not empty")]
    UnchangedRecordHasType,

    #[error("TNF is set to 'unchanged' but id flag is on")]
    UnchangedRecordHasId,

    #[error("TNF is set to 'reserved' (0x07)")]
    ReservedTnf,

    #[error("{rtd} payload missing status byte")]
    MissingStatusByte { rtd: &'static str },

    #[error("RTD_TEXT contains invalid language code length")]
    LanguageCodeLengthInvalid,

    #[error("RTD_TEXT contains language code with invalid encoding")]
    LanguageCodeEncodingInvalid,

    #[error("RTD_TEXT payload failed to decode as {encoding}")]
    TextEncodingInvalid { encoding: &'static str },

    #[error("RTD_URI payload starts with an invalid URI identifier code ({code:#04x})")]
    UriAbbreviationCodeInvalid { code: u8 },

    #[error("RTD_URI payload failed to decode as utf-8")]
    UriEncodingInvalid,

    #[error("RTD_SMART_POSTER message contains no RTD_URI record")]
    SmartPosterMissingUri,

    #[error("smart poster nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },

    #[error("empty NDEF message")]
    EmptyMessage,

    #[error("first record's MB flag is off")]
    MissingBeginFlag,

    #[error("MB flag is on for non-first record {index}")]
    UnexpectedBeginFlag { index: usize },

    #[error("last record's ME flag is off")]
    MissingEndFlag,

    #[error("ME flag is on for non-last record {index}")]
    UnexpectedEndFlag { index: usize },

    #[error("record {index} chunk type is not 'unchanged'")]
    ChunkTypeMismatch { index: usize },

    #[error("non-chunked record {index} type is 'unchanged'")]
    UnexpectedUnchangedType { index: usize },

    #[error("last record still chunked")]
    UnterminatedChunk,

    #[error("first record has no type, but is also not empty or unknown")]
    MissingTypeOnFirstRecord,

    #[error("invalid NDEF TLV: {reason}")]
    InvalidTlv { reason: String },
}

impl NdefError {
    pub fn kind(&self) -> ErrorKind {
        use NdefError::*;
        match self {
            Truncated { .. } => ErrorKind::Truncation,
            ValueOutOfRange { .. } => ErrorKind::EncodingInput,
            EmptyRecordNotEmpty
            | UnknownRecordHasType
            | UnchangedRecordHasType
            | UnchangedRecordHasId
            | ReservedTnf
            | MissingStatusByte { .. }
            | LanguageCodeLengthInvalid
            | LanguageCodeEncodingInvalid
            | TextEncodingInvalid { .. }
            | UriAbbreviationCodeInvalid { .. }
            | UriEncodingInvalid
            | SmartPosterMissingUri
            | NestingTooDeep { .. } => ErrorKind::Record,
            EmptyMessage
            | MissingBeginFlag
            | UnexpectedBeginFlag { .. }
            | MissingEndFlag
            | UnexpectedEndFlag { .. }
            | ChunkTypeMismatch { .. }
            | UnexpectedUnchangedType { .. }
            | UnterminatedChunk
            | MissingTypeOnFirstRecord => ErrorKind::Message,
            InvalidTlv { .. } => ErrorKind::Container,
        }
    }

    pub(crate) fn invalid_tlv(reason: impl Into<String>) -> Self {
        Self::InvalidTlv {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NdefError>;
