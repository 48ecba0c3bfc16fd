// src/record.rs
use log::trace;

use crate::buffer::{BufferReader, BufferWriter};
use crate::config::{VerifyConfig, VerifyContext};
use crate::error::{NdefError, Result};
use crate::rtd;
use crate::types::{RecordFlags, SHORT_PAYLOAD_MAX, Tnf};

/// One NDEF record.
///
/// Length fields are never stored: they are always the lengths of the byte
/// strings held here. Mutators keep the ID and short-record flags in step
/// with the data they describe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NdefRecord {
    flags: RecordFlags,
    tnf: Tnf,
    record_type: Vec<u8>,
    id: Vec<u8>,
    payload: Vec<u8>,
}

impl Default for NdefRecord {
    fn default() -> Self {
        Self {
            flags: RecordFlags {
                short: true,
                ..RecordFlags::default()
            },
            tnf: Tnf::Empty,
            record_type: Vec::new(),
            id: Vec::new(),
            payload: Vec::new(),
        }
    }
}

impl NdefRecord {
    /// Builds an unverified record; fails only if a field is too long for its length field.
    pub fn new(
        tnf: Tnf,
        record_type: impl Into<Vec<u8>>,
        id: impl Into<Vec<u8>>,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let mut record = NdefRecord {
            tnf,
            ..NdefRecord::default()
        };
        record.set_type(record_type)?;
        record.set_id(id)?;
        record.set_payload(payload)?;
        Ok(record)
    }

    pub fn tnf(&self) -> Tnf {
        self.tnf
    }

    pub fn flags(&self) -> RecordFlags {
        self.flags
    }

    pub fn record_type(&self) -> &[u8] {
        &self.record_type
    }

    pub fn id(&self) -> &[u8] {
        &self.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn set_tnf(&mut self, tnf: Tnf) {
        self.tnf = tnf;
    }

    pub fn set_type(&mut self, record_type: impl Into<Vec<u8>>) -> Result<()> {
        let record_type = record_type.into();
        check_width(record_type.len(), 8)?;
        self.record_type = record_type;
        Ok(())
    }

    /// An empty id clears the IL flag.
    pub fn set_id(&mut self, id: impl Into<Vec<u8>>) -> Result<()> {
        let id = id.into();
        check_width(id.len(), 8)?;
        self.flags.id = !id.is_empty();
        self.id = id;
        Ok(())
    }

    /// Also picks the short-record layout when the payload fits one length byte.
    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) -> Result<()> {
        let payload = payload.into();
        check_width(payload.len(), 32)?;
        self.flags.short = payload.len() <= SHORT_PAYLOAD_MAX;
        self.payload = payload;
        Ok(())
    }

    pub fn set_chunked(&mut self, chunked: bool) {
        self.flags.chunked = chunked;
    }

    pub fn set_message_begin(&mut self, begin: bool) {
        self.flags.message_begin = begin;
    }

    pub fn set_message_end(&mut self, end: bool) {
        self.flags.message_end = end;
    }

    /// Reads and verifies one record at the reader's position.
    pub fn read(reader: &mut BufferReader<'_>, config: &VerifyConfig) -> Result<Self> {
        Self::decode(reader, VerifyContext::top(config))
    }

    pub(crate) fn decode(reader: &mut BufferReader<'_>, ctx: VerifyContext<'_>) -> Result<Self> {
        let start = reader.position();
        let header = reader.read_u8()?;
        let flags = RecordFlags::from_raw(header);
        let tnf = Tnf::from_bits(header);

        let type_len = usize::from(reader.read_u8()?);
        let payload_len = if flags.short {
            usize::from(reader.read_u8()?)
        } else {
            reader.read_u32()? as usize
        };
        let id_len = if flags.id {
            usize::from(reader.read_u8()?)
        } else {
            0
        };

        let record_type = reader.read_bytes(type_len)?.to_vec();
        let id = if flags.id {
            reader.read_bytes(id_len)?.to_vec()
        } else {
            Vec::new()
        };
        let payload = reader.read_bytes(payload_len)?.to_vec();

        let record = NdefRecord {
            flags,
            tnf,
            record_type,
            id,
            payload,
        };
        trace!(
            "record @{start}: header={header:#04x} tnf={tnf:?} type_len={type_len} id_len={id_len} payload_len={payload_len}"
        );
        record.verify_in(ctx)?;
        Ok(record)
    }

    /// Record-level checks with the default config.
    pub fn verify(&self) -> Result<()> {
        self.verify_with(&VerifyConfig::default())
    }

    pub fn verify_with(&self, config: &VerifyConfig) -> Result<()> {
        self.verify_in(VerifyContext::top(config))
    }

    pub(crate) fn verify_in(&self, ctx: VerifyContext<'_>) -> Result<()> {
        match self.tnf {
            Tnf::Empty => {
                if !self.record_type.is_empty() || !self.id.is_empty() || !self.payload.is_empty() {
                    return Err(NdefError::EmptyRecordNotEmpty);
                }
            }
            Tnf::Unknown => {
                if !self.record_type.is_empty() {
                    return Err(NdefError::UnknownRecordHasType);
                }
            }
            Tnf::Unchanged => {
                if !self.record_type.is_empty() {
                    return Err(NdefError::UnchangedRecordHasType);
                }
                if self.flags.id {
                    return Err(NdefError::UnchangedRecordHasId);
                }
            }
            Tnf::Reserved => return Err(NdefError::ReservedTnf),
            Tnf::WellKnown => {
                if let Some(validate) = rtd::validator_for(&self.record_type) {
                    validate(&self.payload, ctx)?;
                }
            }
            Tnf::MediaType | Tnf::AbsoluteUri | Tnf::External => {}
        }
        Ok(())
    }

    /// Size of this record on the wire.
    pub fn encoded_len(&self) -> usize {
        let payload_len_width = if self.flags.short { 1 } else { 4 };
        let id_len_width = usize::from(self.flags.id);
        2 + payload_len_width
            + id_len_width
            + self.record_type.len()
            + self.id.len()
            + self.payload.len()
    }

    pub fn write(&self, w: &mut BufferWriter) -> Result<()> {
        w.write_u8(u64::from(self.flags.to_raw() | self.tnf.bits()))?;
        w.write_u8(self.record_type.len() as u64)?;
        if self.flags.short {
            w.write_u8(self.payload.len() as u64)?;
        } else {
            w.write_u32(self.payload.len() as u64)?;
        }
        if self.flags.id {
            w.write_u8(self.id.len() as u64)?;
        }
        w.write_bytes(&self.record_type);
        if self.flags.id {
            w.write_bytes(&self.id);
        }
        w.write_bytes(&self.payload);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = BufferWriter::new();
        self.write(&mut w)?;
        Ok(w.finalize())
    }
}

fn check_width(len: usize, bits: u32) -> Result<()> {
    let len = len as u64;
    if len >> bits != 0 {
        return Err(NdefError::ValueOutOfRange { value: len, bits });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RTD_TEXT;

    fn decode_hex(data: &str) -> Result<NdefRecord> {
        let buf = hex::decode(data).unwrap();
        let mut r = BufferReader::new(&buf);
        NdefRecord::read(&mut r, &VerifyConfig::default())
    }

    #[test]
    fn decodes_short_text_record() {
        let record = decode_hex("D1010F5402656E48656C6C6F20776F726C6421").unwrap();
        assert_eq!(record.tnf(), Tnf::WellKnown);
        assert_eq!(record.record_type(), RTD_TEXT);
        assert!(record.id().is_empty());
        assert_eq!(record.payload()[0], 0x02);
        assert_eq!(&record.payload()[3..], b"Hello world!");
        let flags = record.flags();
        assert!(flags.message_begin && flags.message_end && flags.short);
    }

    #[test]
    fn decodes_long_record_with_id() {
        let record = decode_hex("c901050000000155610123456761").unwrap();
        assert!(!record.flags().short);
        assert_eq!(record.id(), b"a");
        assert_eq!(record.payload(), hex::decode("0123456761").unwrap());
        // long layout survives a re-encode
        assert_eq!(
            hex::encode(record.to_bytes().unwrap()),
            "c901050000000155610123456761"
        );
        assert_eq!(record.encoded_len(), 14);
    }

    #[test]
    fn truncated_record_fails() {
        assert!(matches!(
            decode_hex("d90105015561"),
            Err(NdefError::Truncated { .. })
        ));
        assert!(matches!(decode_hex("d9"), Err(NdefError::Truncated { .. })));
    }

    #[test]
    fn tnf_rules() {
        assert!(decode_hex("d00000").is_ok());
        assert_eq!(decode_hex("d00001ff"), Err(NdefError::EmptyRecordNotEmpty));
        assert_eq!(decode_hex("d8000001ff"), Err(NdefError::EmptyRecordNotEmpty));
        assert_eq!(decode_hex("d00100ff"), Err(NdefError::EmptyRecordNotEmpty));
        assert!(decode_hex("d50000").is_ok());
        assert_eq!(decode_hex("d50100ff"), Err(NdefError::UnknownRecordHasType));
        assert_eq!(decode_hex("d60100ff"), Err(NdefError::UnchangedRecordHasType));
        assert_eq!(decode_hex("de000000"), Err(NdefError::UnchangedRecordHasId));
        assert_eq!(decode_hex("d70000"), Err(NdefError::ReservedTnf));
        assert_eq!(decode_hex("d70100ff"), Err(NdefError::ReservedTnf));
    }

    #[test]
    fn unvalidated_well_known_type_passes_through() {
        // type "act" with a payload that would be nonsense as text
        assert!(decode_hex("d10301616374ff").is_ok());
    }

    #[test]
    fn mutators_keep_flags_consistent() {
        let mut record = NdefRecord::new(Tnf::MediaType, "text/plain", "", vec![0u8; 255]).unwrap();
        assert!(record.flags().short);
        assert!(!record.flags().id);

        record.set_payload(vec![0u8; 256]).unwrap();
        assert!(!record.flags().short);
        record.set_id("x").unwrap();
        assert!(record.flags().id);
        record.set_id(Vec::<u8>::new()).unwrap();
        assert!(!record.flags().id);

        let bytes = record.to_bytes().unwrap();
        assert_eq!(bytes.len(), record.encoded_len());
        assert_eq!(bytes[0] & 0x10, 0);
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let err = NdefRecord::new(Tnf::External, vec![b'x'; 256], "", "").unwrap_err();
        assert_eq!(err, NdefError::ValueOutOfRange { value: 256, bits: 8 });
        assert!(NdefRecord::new(Tnf::External, "a:b", vec![0u8; 300], "").is_err());
    }

    #[test]
    fn verify_is_repeatable() {
        let record = decode_hex("d101015500").unwrap();
        let before = record.clone();
        assert!(record.verify().is_ok());
        assert!(record.verify().is_ok());
        assert_eq!(record, before);
    }
}
