//! Little-endian wire codec primitives
//!
//! Every multi-byte field on the wire is little-endian. Strings are a u32
//! length prefix followed by raw bytes, no terminator. Encoders append to a
//! `Vec<u8>`; decoding goes through [`ByteReader`], whose read methods return
//! `None` once the input runs out.

/// Append a u16 in little-endian order
pub fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a u32 in little-endian order
pub fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a u64 in little-endian order
pub fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append an f32 in little-endian order
pub fn put_f32(buf: &mut Vec<u8>, value: f32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a u32 length prefix followed by the string bytes
pub fn put_str(buf: &mut Vec<u8>, value: &str) {
    put_u32(buf, value.len() as u32);
    buf.extend_from_slice(value.as_bytes());
}

/// Cursor over a byte slice for decoding wire fields
///
/// A failed read leaves the cursor where it was, so a caller can report
/// "no value" without having consumed anything for that field.
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.offset.checked_add(len)?;
        if end > self.data.len() {
            return None;
        }
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Some(slice)
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        self.take(2)?.try_into().ok().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.take(4)?.try_into().ok().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Option<u64> {
        self.take(8)?.try_into().ok().map(u64::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Option<f32> {
        self.take(4)?.try_into().ok().map(f32::from_le_bytes)
    }

    /// Read a u32-length-prefixed string. Fails if the declared length
    /// exceeds the remaining bytes or the bytes are not valid UTF-8.
    pub fn read_string(&mut self) -> Option<String> {
        let start = self.offset;
        let len = self.read_u32()? as usize;
        match self.take(len) {
            Some(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => Some(s.to_owned()),
                Err(_) => {
                    self.offset = start;
                    None
                }
            },
            None => {
                self.offset = start;
                None
            }
        }
    }
}
