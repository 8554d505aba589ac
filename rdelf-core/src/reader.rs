use crate::error::{Error, Result, Structure};
use byteorder::{ReadBytesExt, BE, LE};
use std::io::{self, Cursor};

/// Byte order of every multi-byte field after the identification block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn display_name(self) -> &'static str {
        match self {
            Endian::Little => "little endian",
            Endian::Big => "big endian",
        }
    }
}

/// Returns the `len` bytes of `buf` that start at `offset`.
pub(crate) fn slice_at(buf: &[u8], offset: u64, len: usize, structure: Structure) -> Result<&[u8]> {
    let Ok(start) = usize::try_from(offset) else {
        return Err(Error::Truncated {
            structure,
            offset,
            needed: len,
            available: 0,
        });
    };
    let end = start
        .checked_add(len)
        .ok_or(Error::OffsetOverflow { structure })?;

    buf.get(start..end).ok_or(Error::Truncated {
        structure,
        offset,
        needed: len,
        available: buf.len().saturating_sub(start),
    })
}

/// Sequential field decoder over one fixed-layout record.
///
/// `base` is the file offset of the first byte of `bytes`, used only to report
/// where a short read happened.
pub(crate) struct FieldReader<'a> {
    cursor: Cursor<&'a [u8]>,
    endian: Endian,
    structure: Structure,
    base: u64,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(bytes: &'a [u8], endian: Endian, structure: Structure, base: u64) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            endian,
            structure,
            base,
        }
    }

    fn short_read(&self, pos: u64, needed: usize) -> Error {
        let len = self.cursor.get_ref().len() as u64;
        Error::Truncated {
            structure: self.structure,
            offset: self.base + pos,
            needed,
            available: len.saturating_sub(pos) as usize,
        }
    }

    // A failed read may leave the cursor at the end, so report from `pos`.
    fn finish<T>(&self, read: io::Result<T>, pos: u64, needed: usize) -> Result<T> {
        read.map_err(|_| self.short_read(pos, needed))
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        let pos = self.cursor.position();
        let read = match self.endian {
            Endian::Little => self.cursor.read_u16::<LE>(),
            Endian::Big => self.cursor.read_u16::<BE>(),
        };
        self.finish(read, pos, 2)
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let pos = self.cursor.position();
        let read = match self.endian {
            Endian::Little => self.cursor.read_u32::<LE>(),
            Endian::Big => self.cursor.read_u32::<BE>(),
        };
        self.finish(read, pos, 4)
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        let pos = self.cursor.position();
        let read = match self.endian {
            Endian::Little => self.cursor.read_u64::<LE>(),
            Endian::Big => self.cursor.read_u64::<BE>(),
        };
        self.finish(read, pos, 8)
    }
}
