// src/buffer.rs
use crate::error::{NdefError, Result};

/// Sequential, bounds-checked reader over an immutable byte buffer.
///
/// Integers are little-endian. Every read either consumes exactly the
/// requested number of bytes or fails with `Truncated` and leaves the
/// offset where it was.
pub struct BufferReader<'a> {
    buf: &'a [u8],
    off: usize,
}

impl<'a> BufferReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, off: 0 }
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.off)
    }

    /// Current cursor position (number of bytes consumed so far).
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.off
    }

    /// End of buffer.
    #[inline]
    #[must_use]
    pub fn eob(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        match self.off.checked_add(len) {
            Some(end) if end <= self.buf.len() => {
                let start = self.off;
                self.off = end;
                Ok(&self.buf[start..end])
            }
            _ => Err(NdefError::Truncated {
                offset: self.off,
                needed: len,
                remaining: self.remaining(),
            }),
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(bytes);
        Ok(arr)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }
}

/// Growable writer for the NDEF primitives.
///
/// Integer writes take a wide value and reject anything that does not fit
/// the field, so callers can pass lengths straight from `len()`.
pub struct BufferWriter {
    buf: Vec<u8>,
}

impl BufferWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    fn narrow<T: TryFrom<u64>>(value: u64, bits: u32) -> Result<T> {
        T::try_from(value).map_err(|_| NdefError::ValueOutOfRange { value, bits })
    }

    pub fn write_u8(&mut self, value: u64) -> Result<()> {
        let v: u8 = Self::narrow(value, 8)?;
        self.buf.push(v);
        Ok(())
    }

    pub fn write_u16(&mut self, value: u64) -> Result<()> {
        let v: u16 = Self::narrow(value, 16)?;
        self.buf.extend_from_slice(&v.to_le_bytes());
        Ok(())
    }

    pub fn write_u32(&mut self, value: u64) -> Result<()> {
        let v: u32 = Self::narrow(value, 32)?;
        self.buf.extend_from_slice(&v.to_le_bytes());
        Ok(())
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn finalize(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for BufferWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_widths_are_little_endian() {
        let buf = hex::decode("0123456789abcdef").unwrap();
        let mut r = BufferReader::new(&buf);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u16().unwrap(), 0x4523);
        assert_eq!(r.read_u32().unwrap(), 0xcdab_8967);
        assert_eq!(r.read_bytes(1).unwrap(), &[0xef]);
        assert!(r.eob());
    }

    #[test]
    fn reader_reports_truncation_without_advancing() {
        let buf = [0xaa, 0xbb];
        let mut r = BufferReader::new(&buf);
        r.read_u8().unwrap();
        let err = r.read_u32().unwrap_err();
        assert_eq!(
            err,
            NdefError::Truncated {
                offset: 1,
                needed: 4,
                remaining: 1
            }
        );
        assert_eq!(r.position(), 1);
        assert!(r.read_bytes(2).is_err());
        assert_eq!(r.read_bytes(0).unwrap(), &[] as &[u8]);
        assert_eq!(r.read_u8().unwrap(), 0xbb);
        assert!(matches!(r.read_u8(), Err(NdefError::Truncated { .. })));
    }

    #[test]
    fn reader_survives_huge_length() {
        let buf = [0u8; 4];
        let mut r = BufferReader::new(&buf);
        r.read_u8().unwrap();
        assert!(r.read_bytes(usize::MAX).is_err());
    }

    #[test]
    fn writer_packs_widths_and_text() {
        let mut w = BufferWriter::new();
        w.write_u8(0x4f).unwrap();
        w.write_u16(0x1234).unwrap();
        w.write_u32(0x1234_5678).unwrap();
        w.write_str("test");
        let mut expected = hex::decode("4f341278563412").unwrap();
        expected.extend_from_slice(b"test");
        assert_eq!(w.finalize(), expected);
    }

    #[test]
    fn writer_rejects_values_wider_than_field() {
        let mut w = BufferWriter::new();
        assert_eq!(
            w.write_u8(1000),
            Err(NdefError::ValueOutOfRange { value: 1000, bits: 8 })
        );
        assert!(w.write_u16(0x1_0000).is_err());
        assert!(w.write_u32(u64::from(u32::MAX) + 1).is_err());
        assert!(w.is_empty());
    }
}
