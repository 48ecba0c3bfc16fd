// src/message.rs
use log::debug;

use crate::buffer::{BufferReader, BufferWriter};
use crate::config::{VerifyConfig, VerifyContext};
use crate::error::{NdefError, Result};
use crate::record::NdefRecord;
use crate::types::Tnf;

/// A verified, non-empty sequence of records.
///
/// There is no outer envelope on the wire: a message is its records
/// back to back, terminated by the end of the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NdefMessage {
    records: Vec<NdefRecord>,
}

impl NdefMessage {
    /// Decodes and verifies `buf` with the default config.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        Self::from_bytes_with(buf, &VerifyConfig::default())
    }

    pub fn from_bytes_with(buf: &[u8], config: &VerifyConfig) -> Result<Self> {
        Self::parse(buf, VerifyContext::top(config))
    }

    pub(crate) fn parse(buf: &[u8], ctx: VerifyContext<'_>) -> Result<Self> {
        let mut reader = BufferReader::new(buf);
        let mut records = Vec::new();
        while !reader.eob() {
            records.push(NdefRecord::decode(&mut reader, ctx)?);
        }
        if records.is_empty() {
            return Err(NdefError::EmptyMessage);
        }

        let message = NdefMessage { records };
        message.verify_structure(ctx.config)?;
        debug!(
            "decoded message: {} records, {} bytes, depth {}",
            message.records.len(),
            buf.len(),
            ctx.depth
        );
        Ok(message)
    }

    /// Takes records as they are (flags included) and verifies them as a message.
    pub fn from_records(records: Vec<NdefRecord>) -> Result<Self> {
        Self::from_records_with(records, &VerifyConfig::default())
    }

    pub fn from_records_with(records: Vec<NdefRecord>, config: &VerifyConfig) -> Result<Self> {
        let message = NdefMessage { records };
        message.verify_with(config)?;
        Ok(message)
    }

    pub fn records(&self) -> &[NdefRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<NdefRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Full verification: every record, then the message-level rules.
    pub fn verify(&self) -> Result<()> {
        self.verify_with(&VerifyConfig::default())
    }

    pub fn verify_with(&self, config: &VerifyConfig) -> Result<()> {
        let ctx = VerifyContext::top(config);
        for record in &self.records {
            record.verify_in(ctx)?;
        }
        self.verify_structure(config)
    }

    fn verify_structure(&self, config: &VerifyConfig) -> Result<()> {
        if self.records.is_empty() {
            return Err(NdefError::EmptyMessage);
        }
        self.verify_begin_end()?;
        self.verify_chunks()?;
        if config.require_type_on_first_record {
            self.verify_first_record_type()?;
        }
        Ok(())
    }

    fn verify_begin_end(&self) -> Result<()> {
        let last = self.records.len() - 1;

        if !self.records[0].flags().message_begin {
            return Err(NdefError::MissingBeginFlag);
        }
        if let Some(index) = self.records[1..]
            .iter()
            .position(|r| r.flags().message_begin)
        {
            return Err(NdefError::UnexpectedBeginFlag { index: index + 1 });
        }
        if !self.records[last].flags().message_end {
            return Err(NdefError::MissingEndFlag);
        }
        if let Some(index) = self.records[..last]
            .iter()
            .position(|r| r.flags().message_end)
        {
            return Err(NdefError::UnexpectedEndFlag { index });
        }
        Ok(())
    }

    fn verify_chunks(&self) -> Result<()> {
        let mut chunked = false;
        for (index, record) in self.records.iter().enumerate() {
            let unchanged = record.tnf() == Tnf::Unchanged;
            if chunked && !unchanged {
                return Err(NdefError::ChunkTypeMismatch { index });
            }
            if !chunked && unchanged {
                return Err(NdefError::UnexpectedUnchangedType { index });
            }
            chunked = record.flags().chunked;
        }
        if chunked {
            return Err(NdefError::UnterminatedChunk);
        }
        Ok(())
    }

    // Android rejects a typed-TNF first record without a type.
    fn verify_first_record_type(&self) -> Result<()> {
        let first = &self.records[0];
        if !matches!(first.tnf(), Tnf::Unknown | Tnf::Empty) && first.record_type().is_empty() {
            return Err(NdefError::MissingTypeOnFirstRecord);
        }
        Ok(())
    }

    pub fn encoded_len(&self) -> usize {
        self.records.iter().map(NdefRecord::encoded_len).sum()
    }

    pub fn write(&self, w: &mut BufferWriter) -> Result<()> {
        for record in &self.records {
            record.write(w)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = BufferWriter::new();
        self.write(&mut w)?;
        Ok(w.finalize())
    }
}

impl TryFrom<&[u8]> for NdefMessage {
    type Error = NdefError;

    fn try_from(buf: &[u8]) -> Result<Self> {
        NdefMessage::from_bytes(buf)
    }
}

/// Builds a message from `(tnf, type, id, payload)` tuples.
///
/// Sets MB on the first record and ME on the last, then verifies the
/// result with the default config.
pub fn new_message<I, T, D, P>(record_defs: I) -> Result<NdefMessage>
where
    I: IntoIterator<Item = (Tnf, T, D, P)>,
    T: Into<Vec<u8>>,
    D: Into<Vec<u8>>,
    P: Into<Vec<u8>>,
{
    new_message_with(record_defs, &VerifyConfig::default())
}

pub fn new_message_with<I, T, D, P>(record_defs: I, config: &VerifyConfig) -> Result<NdefMessage>
where
    I: IntoIterator<Item = (Tnf, T, D, P)>,
    T: Into<Vec<u8>>,
    D: Into<Vec<u8>>,
    P: Into<Vec<u8>>,
{
    let mut records = record_defs
        .into_iter()
        .map(|(tnf, record_type, id, payload)| NdefRecord::new(tnf, record_type, id, payload))
        .collect::<Result<Vec<_>>>()?;

    if let Some(first) = records.first_mut() {
        first.set_message_begin(true);
    }
    if let Some(last) = records.last_mut() {
        last.set_message_end(true);
    }

    NdefMessage::from_records_with(records, config)
}
