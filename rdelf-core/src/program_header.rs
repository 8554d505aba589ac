use crate::error::{Error, Result, Structure};
use crate::header::Header;
use crate::reader::{slice_at, Endian, FieldReader};
use std::fmt;

pub const PT_NULL: u32 = 0;
pub const PT_LOAD: u32 = 1;
pub const PT_DYNAMIC: u32 = 2;
pub const PT_INTERP: u32 = 3;
pub const PT_NOTE: u32 = 4;
pub const PT_SHLIB: u32 = 5;
pub const PT_PHDR: u32 = 6;
pub const PT_TLS: u32 = 7;
pub const PT_NUM: u32 = 8;
pub const PT_GNU_EH_FRAME: u32 = 0x6474_e550;
pub const PT_GNU_STACK: u32 = 0x6474_e551;
pub const PT_GNU_RELRO: u32 = 0x6474_e552;

pub const PF_X: u32 = 1 << 0;
pub const PF_W: u32 = 1 << 1;
pub const PF_R: u32 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentType {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Shlib,
    Phdr,
    Tls,
    Num,
    GnuEhFrame,
    GnuStack,
    GnuRelro,
    Unknown(u32),
}

impl SegmentType {
    pub fn from_raw(v: u32) -> Self {
        match v {
            PT_NULL => SegmentType::Null,
            PT_LOAD => SegmentType::Load,
            PT_DYNAMIC => SegmentType::Dynamic,
            PT_INTERP => SegmentType::Interp,
            PT_NOTE => SegmentType::Note,
            PT_SHLIB => SegmentType::Shlib,
            PT_PHDR => SegmentType::Phdr,
            PT_TLS => SegmentType::Tls,
            PT_NUM => SegmentType::Num,
            PT_GNU_EH_FRAME => SegmentType::GnuEhFrame,
            PT_GNU_STACK => SegmentType::GnuStack,
            PT_GNU_RELRO => SegmentType::GnuRelro,
            other => SegmentType::Unknown(other),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SegmentType::Null => "NULL",
            SegmentType::Load => "LOAD",
            SegmentType::Dynamic => "DYNAMIC",
            SegmentType::Interp => "INTERP",
            SegmentType::Note => "NOTE",
            SegmentType::Shlib => "SHLIB",
            SegmentType::Phdr => "PHDR",
            SegmentType::Tls => "TLS",
            SegmentType::Num => "Num",
            SegmentType::GnuEhFrame => "GNU_EH_FRAME",
            SegmentType::GnuStack => "GNU_STACK",
            SegmentType::GnuRelro => "GNU_RELRO",
            SegmentType::Unknown(_) => "Unknown",
        }
    }
}

/// `p_flags` bitmask.
///
/// Displays as three fixed-width columns, R then W then X, each holding either
/// the permission word or the same number of blanks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentFlags(pub u32);

impl SegmentFlags {
    const COLUMNS: [(u32, &'static str); 3] =
        [(PF_R, "Readable"), (PF_W, "Writable"), (PF_X, "Executable")];

    pub fn readable(self) -> bool {
        self.0 & PF_R != 0
    }

    pub fn writable(self) -> bool {
        self.0 & PF_W != 0
    }

    pub fn executable(self) -> bool {
        self.0 & PF_X != 0
    }
}

impl fmt::Display for SegmentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (bit, word)) in Self::COLUMNS.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if self.0 & bit != 0 {
                f.write_str(word)?;
            } else {
                write!(f, "{:width$}", "", width = word.len())?;
            }
        }
        Ok(())
    }
}

/// One decoded `Elf64_Phdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHeader {
    pub p_type: SegmentType,
    pub p_flags: SegmentFlags,
    /// Segment file offset.
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    /// Segment size in the file.
    pub p_filesz: u64,
    /// Segment size in memory.
    pub p_memsz: u64,
    pub p_align: u64,
}

impl ProgramHeader {
    /// On-disk size of `Elf64_Phdr`.
    pub const SIZE: usize = 56;

    /// Decodes one entry located at file offset `offset`.
    pub fn parse(buf: &[u8], offset: u64, endian: Endian, index: usize) -> Result<Self> {
        let structure = Structure::ProgramHeader(index);
        let bytes = slice_at(buf, offset, Self::SIZE, structure)?;
        let mut cur = FieldReader::new(bytes, endian, structure, offset);

        Ok(ProgramHeader {
            p_type: SegmentType::from_raw(cur.u32()?),
            p_flags: SegmentFlags(cur.u32()?),
            p_offset: cur.u64()?,
            p_vaddr: cur.u64()?,
            p_paddr: cur.u64()?,
            p_filesz: cur.u64()?,
            p_memsz: cur.u64()?,
            p_align: cur.u64()?,
        })
    }

    /// Decodes all `e_phnum` entries of the program header table.
    ///
    /// Entry `i` starts at `e_phoff + i * e_phentsize`; only its first
    /// [`Self::SIZE`] bytes are read. Fails on the first entry that does not fit
    /// in `buf`, discarding the entries decoded before it.
    pub fn parse_table<H: Header + ?Sized>(buf: &[u8], header: &H) -> Result<Vec<Self>> {
        let table = header.program_headers();
        let endian = header.byte_order();

        if table.count > 0 && usize::from(table.entry_size) < Self::SIZE {
            log::warn!(
                "Declared program header size {} is smaller than {}; entries overlap",
                table.entry_size,
                Self::SIZE
            );
        }

        let mut entries = Vec::with_capacity(usize::from(table.count));
        for i in 0..usize::from(table.count) {
            let offset = table.entry_offset(i).ok_or(Error::OffsetOverflow {
                structure: Structure::ProgramHeader(i),
            })?;
            entries.push(Self::parse(buf, offset, endian, i)?);
        }

        log::debug!("Decoded {} program headers", entries.len());
        Ok(entries)
    }
}
