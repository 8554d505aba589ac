use crate::error::{Error, Result, Structure};
use crate::header::Header;
use crate::reader::{slice_at, Endian, FieldReader};
use std::fmt;

pub const SHT_NULL: u32 = 0;
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_RELA: u32 = 4;
pub const SHT_HASH: u32 = 5;
pub const SHT_DYNAMIC: u32 = 6;
pub const SHT_NOTE: u32 = 7;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_REL: u32 = 9;
pub const SHT_SHLIB: u32 = 10;
pub const SHT_DYNSYM: u32 = 11;
pub const SHT_INIT_ARRAY: u32 = 14;
pub const SHT_FINI_ARRAY: u32 = 15;
pub const SHT_PREINIT_ARRAY: u32 = 16;
pub const SHT_GROUP: u32 = 17;
pub const SHT_SYMTAB_SHNDX: u32 = 18;
pub const SHT_NUM: u32 = 19;
pub const SHT_GNU_HASH: u32 = 0x6fff_fff6;
pub const SHT_GNU_VERNEED: u32 = 0x6fff_fffe;
pub const SHT_GNU_VERSYM: u32 = 0x6fff_ffff;

pub const SHF_WRITE: u64 = 1 << 0;
pub const SHF_ALLOC: u64 = 1 << 1;
pub const SHF_EXECINSTR: u64 = 1 << 2;
pub const SHF_MERGE: u64 = 1 << 4;
pub const SHF_STRINGS: u64 = 1 << 5;
pub const SHF_INFO_LINK: u64 = 1 << 6;
pub const SHF_LINK_ORDER: u64 = 1 << 7;
pub const SHF_OS_NONCONFORMING: u64 = 1 << 8;
pub const SHF_GROUP: u64 = 1 << 9;
pub const SHF_TLS: u64 = 1 << 10;
pub const SHF_COMPRESSED: u64 = 1 << 11;
pub const SHF_EXCLUDE: u64 = 1 << 31;

/// Undefined section index.
pub const SHN_UNDEF: u16 = 0;
/// `e_shstrndx` escape: the real index is in `sh_link` of section 0.
pub const SHN_XINDEX: u16 = 0xffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    Null,
    Progbits,
    Symtab,
    Strtab,
    Rela,
    Hash,
    Dynamic,
    Note,
    Nobits,
    Rel,
    Shlib,
    Dynsym,
    InitArray,
    FiniArray,
    PreinitArray,
    Group,
    SymtabShndx,
    Num,
    GnuHash,
    GnuVerneed,
    GnuVersym,
    Unknown(u32),
}

impl SectionType {
    pub fn from_raw(v: u32) -> Self {
        match v {
            SHT_NULL => SectionType::Null,
            SHT_PROGBITS => SectionType::Progbits,
            SHT_SYMTAB => SectionType::Symtab,
            SHT_STRTAB => SectionType::Strtab,
            SHT_RELA => SectionType::Rela,
            SHT_HASH => SectionType::Hash,
            SHT_DYNAMIC => SectionType::Dynamic,
            SHT_NOTE => SectionType::Note,
            SHT_NOBITS => SectionType::Nobits,
            SHT_REL => SectionType::Rel,
            SHT_SHLIB => SectionType::Shlib,
            SHT_DYNSYM => SectionType::Dynsym,
            SHT_INIT_ARRAY => SectionType::InitArray,
            SHT_FINI_ARRAY => SectionType::FiniArray,
            SHT_PREINIT_ARRAY => SectionType::PreinitArray,
            SHT_GROUP => SectionType::Group,
            SHT_SYMTAB_SHNDX => SectionType::SymtabShndx,
            SHT_NUM => SectionType::Num,
            SHT_GNU_HASH => SectionType::GnuHash,
            SHT_GNU_VERNEED => SectionType::GnuVerneed,
            SHT_GNU_VERSYM => SectionType::GnuVersym,
            other => SectionType::Unknown(other),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SectionType::Null => "Null",
            SectionType::Progbits => "Progbit",
            SectionType::Symtab => "Symtab",
            SectionType::Strtab => "Strtab",
            SectionType::Rela => "Rela",
            SectionType::Hash => "Hash",
            SectionType::Dynamic => "Dynamic",
            SectionType::Note => "Note",
            SectionType::Nobits => "Nobits",
            SectionType::Rel => "Rel",
            SectionType::Shlib => "Shlib",
            SectionType::Dynsym => "Dynsym",
            SectionType::InitArray => "Initarray",
            SectionType::FiniArray => "Finiarray",
            SectionType::PreinitArray => "Preinitarray",
            SectionType::Group => "Group",
            SectionType::SymtabShndx => "Symtabshndx",
            SectionType::Num => "Num",
            SectionType::GnuHash => "GNU_hash",
            SectionType::GnuVerneed => "GNU_verneed",
            SectionType::GnuVersym => "GNU_versym",
            SectionType::Unknown(_) => "Unknown",
        }
    }
}

/// `sh_flags` bitmask.
///
/// Displays as one column per known flag, in the order
/// `W A X M S I L O G T E C`, with a blank for every unset flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionFlags(pub u64);

impl SectionFlags {
    pub const COLUMNS: [(u64, char); 12] = [
        (SHF_WRITE, 'W'),
        (SHF_ALLOC, 'A'),
        (SHF_EXECINSTR, 'X'),
        (SHF_MERGE, 'M'),
        (SHF_STRINGS, 'S'),
        (SHF_INFO_LINK, 'I'),
        (SHF_LINK_ORDER, 'L'),
        (SHF_OS_NONCONFORMING, 'O'),
        (SHF_GROUP, 'G'),
        (SHF_TLS, 'T'),
        (SHF_EXCLUDE, 'E'),
        (SHF_COMPRESSED, 'C'),
    ];

    pub fn contains(self, flag: u64) -> bool {
        self.0 & flag == flag
    }
}

impl fmt::Display for SectionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (bit, letter) in Self::COLUMNS {
            let c = if self.contains(bit) { letter } else { ' ' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// One decoded `Elf64_Shdr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// Resolved from the section header string table, empty when unavailable.
    pub name: String,
    /// Offset of the name in the section header string table.
    pub sh_name: u32,
    pub sh_type: SectionType,
    pub sh_flags: SectionFlags,
    /// Virtual address at execution.
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    /// Entry size if the section holds a table.
    pub sh_entsize: u64,
}

impl SectionHeader {
    /// On-disk size of `Elf64_Shdr`.
    pub const SIZE: usize = 64;

    /// Decodes one entry located at file offset `offset`. The name is left empty.
    pub fn parse(buf: &[u8], offset: u64, endian: Endian, index: usize) -> Result<Self> {
        let structure = Structure::SectionHeader(index);
        let bytes = slice_at(buf, offset, Self::SIZE, structure)?;
        let mut cur = FieldReader::new(bytes, endian, structure, offset);

        Ok(SectionHeader {
            name: String::new(),
            sh_name: cur.u32()?,
            sh_type: SectionType::from_raw(cur.u32()?),
            sh_flags: SectionFlags(cur.u64()?),
            sh_addr: cur.u64()?,
            sh_offset: cur.u64()?,
            sh_size: cur.u64()?,
            sh_link: cur.u32()?,
            sh_info: cur.u32()?,
            sh_addralign: cur.u64()?,
            sh_entsize: cur.u64()?,
        })
    }

    /// Decodes all `e_shnum` entries of the section header table and resolves
    /// their names.
    ///
    /// Addressing follows [`crate::ProgramHeader::parse_table`]: declared stride,
    /// fixed 64-byte layout, all-or-nothing.
    pub fn parse_table<H: Header + ?Sized>(buf: &[u8], header: &H) -> Result<Vec<Self>> {
        let table = header.section_headers();
        let endian = header.byte_order();

        if table.count > 0 && usize::from(table.entry_size) < Self::SIZE {
            log::warn!(
                "Declared section header size {} is smaller than {}; entries overlap",
                table.entry_size,
                Self::SIZE
            );
        }

        let mut sections = Vec::with_capacity(usize::from(table.count));
        for i in 0..usize::from(table.count) {
            let offset = table.entry_offset(i).ok_or(Error::OffsetOverflow {
                structure: Structure::SectionHeader(i),
            })?;
            sections.push(Self::parse(buf, offset, endian, i)?);
        }

        resolve_names(buf, &mut sections, header.string_table_index());
        log::debug!("Decoded {} section headers", sections.len());
        Ok(sections)
    }
}

/// Fills in `name` for every section from the section header string table.
///
/// Best effort: a missing table or an out-of-range name offset leaves the name
/// empty.
pub fn resolve_names(buf: &[u8], sections: &mut [SectionHeader], shstrndx: u16) {
    let index = match shstrndx {
        SHN_UNDEF => return,
        SHN_XINDEX => match sections.first() {
            Some(first) => first.sh_link as usize,
            None => return,
        },
        i => usize::from(i),
    };

    let Some(strtab) = sections.get(index) else {
        log::warn!(
            "String table index {index} is out of range ({} sections)",
            sections.len()
        );
        return;
    };

    let table = usize::try_from(strtab.sh_size)
        .ok()
        .and_then(|len| slice_at(buf, strtab.sh_offset, len, Structure::SectionHeader(index)).ok());
    let Some(table) = table else {
        log::warn!(
            "String table at {:#x} (+{:#x}) lies outside the file",
            strtab.sh_offset,
            strtab.sh_size
        );
        return;
    };

    for section in sections.iter_mut() {
        match name_at(table, section.sh_name) {
            Some(name) => section.name = name,
            None => log::warn!("Section name offset {:#x} is out of range", section.sh_name),
        }
    }
}

fn name_at(strtab: &[u8], offset: u32) -> Option<String> {
    let rest = strtab.get(offset as usize..)?;
    let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    Some(String::from_utf8_lossy(&rest[..end]).into_owned())
}
