use crate::boxes::FourCC;
use crate::error::{ParseError, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::Serialize;

/// Byte order used for multi-byte primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// Bounds-checked sequential reader over an in-memory buffer.
///
/// A failed read never moves the position. `mark`/`reset` keep a stack of
/// saved positions for lookahead.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endian,
    marks: Vec<usize>,
}

macro_rules! read_multibyte {
    ($($name:ident => $ty:ty, $n:expr, $read:ident;)*) => {
        $(
            pub fn $name(&mut self) -> Result<$ty> {
                let b = self.take($n)?;
                Ok(match self.endian {
                    Endian::Big => BigEndian::$read(b),
                    Endian::Little => LittleEndian::$read(b),
                })
            }
        )*
    };
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8], endian: Endian) -> Self {
        Self {
            buf,
            pos: 0,
            endian,
            marks: Vec::new(),
        }
    }

    pub fn big_endian(buf: &'a [u8]) -> Self {
        Self::new(buf, Endian::Big)
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn len(&self) -> u64 {
        self.buf.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    /// Bytes left between the position and the end of the buffer.
    pub fn remaining(&self) -> u64 {
        (self.buf.len() - self.pos) as u64
    }

    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.len() {
            return Err(ParseError::OutOfRange {
                pos,
                wanted: 0,
                len: self.len(),
            });
        }
        self.pos = pos as usize;
        Ok(())
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Save the current position.
    pub fn mark(&mut self) {
        self.marks.push(self.pos);
    }

    /// Return to the most recently marked position and drop the mark.
    pub fn reset(&mut self) {
        if let Some(p) = self.marks.pop() {
            self.pos = p;
        }
    }

    /// Drop the most recent mark without moving.
    pub fn unmark(&mut self) {
        self.marks.pop();
    }

    fn out_of_range(&self, wanted: u64) -> ParseError {
        ParseError::OutOfRange {
            pos: self.position(),
            wanted,
            len: self.len(),
        }
    }

    fn take(&mut self, n: u64) -> Result<&'a [u8]> {
        let b = self.peek_bytes(n)?;
        self.pos += b.len();
        Ok(b)
    }

    pub fn peek_bytes(&self, n: u64) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(self.out_of_range(n));
        }
        Ok(&self.buf[self.pos..self.pos + n as usize])
    }

    pub fn peek_u8(&self) -> Result<u8> {
        Ok(self.peek_bytes(1)?[0])
    }

    pub fn read_bytes(&mut self, n: u64) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N as u64)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_multibyte! {
        read_u16 => u16, 2, read_u16;
        read_u32 => u32, 4, read_u32;
        read_u64 => u64, 8, read_u64;
        read_i16 => i16, 2, read_i16;
        read_i32 => i32, 4, read_i32;
        read_i64 => i64, 8, read_i64;
        read_f32 => f32, 4, read_f32;
        read_f64 => f64, 8, read_f64;
    }

    /// 24-bit value, as used by FullBox flags.
    pub fn read_u24(&mut self) -> Result<u32> {
        let b = self.take(3)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u24(b),
            Endian::Little => LittleEndian::read_u24(b),
        })
    }

    pub fn read_fourcc(&mut self) -> Result<FourCC> {
        Ok(FourCC(self.read_array()?))
    }

    /// Reads a NUL-terminated string that may not run past `limit`.
    ///
    /// The terminator is consumed. A string that reaches `limit` without a
    /// terminator takes everything up to it.
    pub fn read_cstring(&mut self, limit: u64) -> Result<String> {
        let avail = limit.saturating_sub(self.position()).min(self.remaining());
        let window = self.peek_bytes(avail)?;
        let (text, used) = match window.iter().position(|&b| b == 0) {
            Some(nul) => (&window[..nul], nul + 1),
            None => (window, window.len()),
        };
        self.pos += used;
        Ok(String::from_utf8_lossy(text).into_owned())
    }
}
