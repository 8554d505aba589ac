use crate::error::{Result, Structure};
use crate::header::{Header, TableLocation};
use crate::ident::{Identification, EI_NIDENT};
use crate::reader::{slice_at, Endian, FieldReader};

pub const ET_NONE: u16 = 0;
pub const ET_REL: u16 = 1;
pub const ET_EXEC: u16 = 2;
pub const ET_DYN: u16 = 3;
pub const ET_CORE: u16 = 4;

pub const EM_NONE: u16 = 0;
pub const EM_SPARC: u16 = 2;
pub const EM_386: u16 = 3;
pub const EM_SPARC32PLUS: u16 = 18;
pub const EM_SPARCV9: u16 = 43;
pub const EM_X86_64: u16 = 62;

/// Object file type (`e_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    None,
    Relocatable,
    Executable,
    Shared,
    Core,
    Unknown(u16),
}

impl ObjectType {
    pub fn from_raw(v: u16) -> Self {
        match v {
            ET_NONE => ObjectType::None,
            ET_REL => ObjectType::Relocatable,
            ET_EXEC => ObjectType::Executable,
            ET_DYN => ObjectType::Shared,
            ET_CORE => ObjectType::Core,
            other => ObjectType::Unknown(other),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ObjectType::None => "An unknown type",
            ObjectType::Relocatable => "A relocatable file",
            ObjectType::Executable => "An executable file",
            ObjectType::Shared => "A shared object",
            ObjectType::Core => "A core file",
            ObjectType::Unknown(_) => "Unknown",
        }
    }
}

/// Target architecture (`e_machine`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Machine {
    None,
    Sparc,
    I386,
    Sparc32Plus,
    SparcV9,
    X86_64,
    Unknown(u16),
}

impl Machine {
    pub fn from_raw(v: u16) -> Self {
        match v {
            EM_NONE => Machine::None,
            EM_SPARC => Machine::Sparc,
            EM_386 => Machine::I386,
            EM_SPARC32PLUS => Machine::Sparc32Plus,
            EM_SPARCV9 => Machine::SparcV9,
            EM_X86_64 => Machine::X86_64,
            other => Machine::Unknown(other),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Machine::None => "An unknown machine",
            Machine::Sparc => "Sun Microsystems SPARC",
            Machine::I386 => "Intel 80386",
            Machine::Sparc32Plus => "SPARC with enhanced instruction set",
            Machine::SparcV9 => "SPARC v9 64-bit",
            Machine::X86_64 => "AMD x86-64",
            Machine::Unknown(_) => "Unknown",
        }
    }
}

/// The ELF header of a 64-bit object file (`Elf64_Ehdr`).
///
/// It appears at the very beginning of every ELF file and describes where the
/// program and section header tables are.
///
/// Reference: [ELF Specification v1.2](https://refspecs.linuxfoundation.org/elf/elf.pdf)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfHeader {
    /// Decoded `e_ident`; its `EI_DATA` byte fixes the order of every field below.
    pub ident: Identification,

    /// Object file type (relocatable, executable, shared, core).
    pub e_type: ObjectType,

    /// Target architecture.
    pub e_machine: Machine,

    /// Object file version (usually `EV_CURRENT` = 1).
    pub e_version: u32,

    /// Virtual address where execution starts.
    pub e_entry: u64,

    /// File offset of the program header table.
    pub e_phoff: u64,

    /// File offset of the section header table.
    pub e_shoff: u64,

    /// Processor-specific flags.
    pub e_flags: u32,

    /// Size of this header (64 for ELF64).
    pub e_ehsize: u16,

    /// Declared size of one program header table entry.
    pub e_phentsize: u16,

    /// Number of entries in the program header table.
    pub e_phnum: u16,

    /// Declared size of one section header table entry.
    pub e_shentsize: u16,

    /// Number of entries in the section header table.
    pub e_shnum: u16,

    /// Index of the section header string table.
    ///
    /// This section contains the names of all other sections.
    pub e_shstrndx: u16,
}

impl ElfHeader {
    /// Bytes that follow `e_ident` in the ELF64 layout.
    pub const FIELDS_SIZE: usize = 48;

    /// Total on-disk size of `Elf64_Ehdr`.
    pub const SIZE: usize = EI_NIDENT + Self::FIELDS_SIZE;

    /// Decodes the identification block and the header that follows it.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let ident = Identification::parse(buf)?;
        let fields = slice_at(
            buf,
            EI_NIDENT as u64,
            Self::FIELDS_SIZE,
            Structure::ElfHeader,
        )?;
        Self::parse_fields(ident, fields)
    }

    /// Decodes the 48 bytes after `e_ident` in the byte order `ident` declares.
    pub fn parse_fields(ident: Identification, fields: &[u8]) -> Result<Self> {
        let mut cur = FieldReader::new(
            fields,
            ident.byte_order(),
            Structure::ElfHeader,
            EI_NIDENT as u64,
        );

        let header = ElfHeader {
            ident,
            e_type: ObjectType::from_raw(cur.u16()?),
            e_machine: Machine::from_raw(cur.u16()?),
            e_version: cur.u32()?,
            e_entry: cur.u64()?,
            e_phoff: cur.u64()?,
            e_shoff: cur.u64()?,
            e_flags: cur.u32()?,
            e_ehsize: cur.u16()?,
            e_phentsize: cur.u16()?,
            e_phnum: cur.u16()?,
            e_shentsize: cur.u16()?,
            e_shnum: cur.u16()?,
            e_shstrndx: cur.u16()?,
        };

        log::debug!(
            "ELF header: type={:?} machine={:?} phnum={} shnum={}",
            header.e_type,
            header.e_machine,
            header.e_phnum,
            header.e_shnum
        );
        Ok(header)
    }

    pub fn is_executable(&self) -> bool {
        self.e_type == ObjectType::Executable
    }
}

impl Header for ElfHeader {
    fn byte_order(&self) -> Endian {
        self.ident.byte_order()
    }

    fn entry_point(&self) -> u64 {
        self.e_entry
    }

    fn program_headers(&self) -> TableLocation {
        TableLocation {
            offset: self.e_phoff,
            entry_size: self.e_phentsize,
            count: self.e_phnum,
        }
    }

    fn section_headers(&self) -> TableLocation {
        TableLocation {
            offset: self.e_shoff,
            entry_size: self.e_shentsize,
            count: self.e_shnum,
        }
    }

    fn string_table_index(&self) -> u16 {
        self.e_shstrndx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ET_NONE, "An unknown type")]
    #[case(ET_REL, "A relocatable file")]
    #[case(ET_EXEC, "An executable file")]
    #[case(ET_DYN, "A shared object")]
    #[case(ET_CORE, "A core file")]
    #[case(0xfe00, "Unknown")]
    fn object_type_names(#[case] raw: u16, #[case] name: &str) {
        assert_eq!(ObjectType::from_raw(raw).display_name(), name);
    }

    #[rstest]
    #[case(EM_NONE, "An unknown machine")]
    #[case(EM_SPARC, "Sun Microsystems SPARC")]
    #[case(EM_386, "Intel 80386")]
    #[case(EM_SPARC32PLUS, "SPARC with enhanced instruction set")]
    #[case(EM_SPARCV9, "SPARC v9 64-bit")]
    #[case(EM_X86_64, "AMD x86-64")]
    #[case(183, "Unknown")]
    fn machine_names(#[case] raw: u16, #[case] name: &str) {
        assert_eq!(Machine::from_raw(raw).display_name(), name);
    }

    #[test]
    fn table_entry_offsets_use_declared_stride() {
        let table = TableLocation {
            offset: 64,
            entry_size: 60,
            count: 3,
        };
        assert_eq!(table.entry_offset(0), Some(64));
        assert_eq!(table.entry_offset(2), Some(184));

        let table = TableLocation {
            offset: u64::MAX - 1,
            entry_size: 56,
            count: 2,
        };
        assert_eq!(table.entry_offset(1), None);
    }
}
