use crate::error::FormatError;

// ── ByteReader ────────────────────────────────────────────────────────────

/// Little-endian cursor over a byte slice.
///
/// Every accessor checks the remaining length first and reports
/// [`FormatError::Truncated`] with the absolute offset of the failed read.
/// `base` is the offset of `buf[0]` within the whole file so that errors from
/// sub-readers still point at the right byte.
#[derive(Debug, Clone)]
pub struct ByteReader<'b> {
    buf: &'b [u8],
    pos: usize,
    base: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buf: &'b [u8]) -> Self {
        Self { buf, pos: 0, base: 0 }
    }

    /// Absolute offset of the next byte to be read.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'b [u8], FormatError> {
        if self.remaining() < n {
            return Err(FormatError::Truncated {
                offset: self.offset(),
                needed: n - self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), FormatError> {
        self.read_bytes(n).map(|_| ())
    }

    /// Reads a four-byte chunk/file tag such as `b"VOX "` or `b"SIZE"`.
    pub fn read_tag(&mut self) -> Result<[u8; 4], FormatError> {
        let b = self.read_bytes(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32, FormatError> {
        let b = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads an `i32` that must be `>= 0` (lengths, counts).
    pub fn read_len(&mut self) -> Result<usize, FormatError> {
        let offset = self.offset();
        let value = self.read_i32()?;
        usize::try_from(value).map_err(|_| FormatError::InvalidSize { offset, value })
    }

    /// Splits off the next `n` bytes as an independent reader.
    ///
    /// The parent advances past the slice; the child reports offsets relative
    /// to the whole file.
    pub fn sub_reader(&mut self, n: usize) -> Result<ByteReader<'b>, FormatError> {
        let base = self.offset();
        let buf = self.read_bytes(n)?;
        Ok(ByteReader { buf, pos: 0, base })
    }
}
