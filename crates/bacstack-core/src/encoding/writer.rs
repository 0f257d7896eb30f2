use crate::EncodeError;

/// Write cursor over a caller-owned buffer.
///
/// A write that does not fit returns [`EncodeError::BufferTooSmall`] and
/// leaves both the buffer and the cursor untouched.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn as_written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), EncodeError> {
        self.write_all(&[value])
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        if self.remaining() < data.len() {
            return Err(EncodeError::BufferTooSmall);
        }
        let end = self.pos + data.len();
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    pub fn write_be_u16(&mut self, value: u16) -> Result<(), EncodeError> {
        self.write_all(&value.to_be_bytes())
    }

    pub fn write_be_u32(&mut self, value: u32) -> Result<(), EncodeError> {
        self.write_all(&value.to_be_bytes())
    }

    /// Overwrites already-written bytes at `offset`, used for length fields
    /// that are only known once the rest of the frame is encoded.
    pub fn patch(&mut self, offset: usize, data: &[u8]) -> Result<(), EncodeError> {
        let end = offset
            .checked_add(data.len())
            .ok_or(EncodeError::InvalidLength)?;
        if end > self.pos {
            return Err(EncodeError::InvalidLength);
        }
        self.buf[offset..end].copy_from_slice(data);
        Ok(())
    }
}
