//! Little-endian byte/bit stream primitives for the sequence tag format.
//!
//! Varints are LEB128 (7 data bits per byte, high bit = continuation);
//! signed varints carry the sign in the least significant bit of the encoded
//! magnitude. Bit access is LSB-first within a byte, and the byte cursor
//! re-aligns upward after bit access, so packed bit runs are implicitly
//! byte-padded.

use crate::foundation::error::{FramepackError, FramepackResult};

/// Append-only stream writer backing the tag serializer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
    bit_pos: usize,
}

impl ByteWriter {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written so far (partial bit bytes included).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the writer, returning the accumulated bytes.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    fn align_byte(&mut self) {
        self.bit_pos = self.bytes.len() * 8;
    }

    /// Write one raw byte.
    pub fn write_u8(&mut self, value: u8) {
        self.align_byte();
        self.bytes.push(value);
        self.bit_pos = self.bytes.len() * 8;
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.align_byte();
        self.bytes.extend_from_slice(data);
        self.bit_pos = self.bytes.len() * 8;
    }

    /// Write a little-endian `u16`.
    pub fn write_u16_le(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write a little-endian `u32`.
    pub fn write_u32_le(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write a little-endian `f32`.
    pub fn write_f32_le(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write an LEB128-encoded `u32`.
    pub fn write_encoded_u32(&mut self, value: u32) {
        self.write_encoded_u64(u64::from(value));
    }

    /// Write an LEB128-encoded `u64`.
    pub fn write_encoded_u64(&mut self, mut value: u64) {
        self.align_byte();
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value > 0 {
                byte |= 0x80;
            }
            self.bytes.push(byte);
            if value == 0 {
                break;
            }
        }
        self.bit_pos = self.bytes.len() * 8;
    }

    /// Write a sign-flagged LEB128 `i32`.
    pub fn write_encoded_i32(&mut self, value: i32) {
        self.write_encoded_i64(i64::from(value));
    }

    /// Write a sign-flagged LEB128 `i64`.
    pub fn write_encoded_i64(&mut self, value: i64) {
        let flag = u64::from(value < 0);
        let magnitude = value.unsigned_abs();
        self.write_encoded_u64((magnitude << 1) | flag);
    }

    /// Write a single bit, LSB-first within the current byte.
    pub fn write_bit(&mut self, value: bool) {
        let byte_index = self.bit_pos / 8;
        if byte_index == self.bytes.len() {
            self.bytes.push(0);
        }
        if value {
            self.bytes[byte_index] |= 1 << (self.bit_pos % 8);
        }
        self.bit_pos += 1;
    }
}

/// Bounded stream reader mirroring [`ByteWriter`].
#[derive(Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Read from `bytes` starting at the beginning.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit_pos: 0 }
    }

    fn byte_pos(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }

    /// Bytes left to read after re-aligning past any partial bit byte.
    pub fn bytes_available(&self) -> usize {
        self.bytes.len().saturating_sub(self.byte_pos())
    }

    fn eof(&self) -> FramepackError {
        FramepackError::codec("end of stream was encountered")
    }

    /// Read one raw byte.
    pub fn read_u8(&mut self) -> FramepackResult<u8> {
        let pos = self.byte_pos();
        let byte = *self.bytes.get(pos).ok_or_else(|| self.eof())?;
        self.bit_pos = (pos + 1) * 8;
        Ok(byte)
    }

    /// Read `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> FramepackResult<&'a [u8]> {
        let pos = self.byte_pos();
        if self.bytes.len() - pos < len {
            return Err(self.eof());
        }
        self.bit_pos = (pos + len) * 8;
        Ok(&self.bytes[pos..pos + len])
    }

    /// Read a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> FramepackResult<u16> {
        let data = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([data[0], data[1]]))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> FramepackResult<u32> {
        let data = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Read a little-endian `f32`.
    pub fn read_f32_le(&mut self) -> FramepackResult<f32> {
        let data = self.read_bytes(4)?;
        Ok(f32::from_le_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Read an LEB128-encoded `u32`.
    pub fn read_encoded_u32(&mut self) -> FramepackResult<u32> {
        let mut value = 0u32;
        let mut pos = self.byte_pos();
        for shift in (0..32).step_by(7) {
            let byte = *self.bytes.get(pos).ok_or_else(|| self.eof())?;
            pos += 1;
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                break;
            }
        }
        self.bit_pos = pos * 8;
        Ok(value)
    }

    /// Read an LEB128-encoded `u64`.
    pub fn read_encoded_u64(&mut self) -> FramepackResult<u64> {
        let mut value = 0u64;
        let mut pos = self.byte_pos();
        for shift in (0..64).step_by(7) {
            let byte = *self.bytes.get(pos).ok_or_else(|| self.eof())?;
            pos += 1;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                break;
            }
        }
        self.bit_pos = pos * 8;
        Ok(value)
    }

    /// Read a sign-flagged LEB128 `i32`.
    pub fn read_encoded_i32(&mut self) -> FramepackResult<i32> {
        Ok(self.read_encoded_i64()? as i32)
    }

    /// Read a sign-flagged LEB128 `i64`.
    pub fn read_encoded_i64(&mut self) -> FramepackResult<i64> {
        let data = self.read_encoded_u64()?;
        let value = (data >> 1) as i64;
        Ok(if data & 1 != 0 { -value } else { value })
    }

    /// Read a single bit, LSB-first within the current byte.
    pub fn read_bit(&mut self) -> FramepackResult<bool> {
        let byte_index = self.bit_pos / 8;
        let byte = *self.bytes.get(byte_index).ok_or_else(|| self.eof())?;
        let bit = byte >> (self.bit_pos % 8) & 1;
        self.bit_pos += 1;
        Ok(bit != 0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/stream.rs"]
mod tests;
