use crate::error::{Result, Structure};
use crate::reader::{slice_at, Endian};

/// Length of `e_ident`.
pub const EI_NIDENT: usize = 16;

pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

pub const EI_CLASS: usize = 4;
pub const EI_DATA: usize = 5;
pub const EI_VERSION: usize = 6;

pub const ELFCLASSNONE: u8 = 0;
pub const ELFCLASS32: u8 = 1;
pub const ELFCLASS64: u8 = 2;
pub const ELFCLASSNUM: u8 = 3;

pub const ELFDATA2LSB: u8 = 1;
pub const ELFDATA2MSB: u8 = 2;

/// File class from `e_ident[EI_CLASS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    None,
    Elf32,
    Elf64,
    Num,
    Unknown(u8),
}

impl Class {
    pub fn from_byte(b: u8) -> Self {
        match b {
            ELFCLASSNONE => Class::None,
            ELFCLASS32 => Class::Elf32,
            ELFCLASS64 => Class::Elf64,
            ELFCLASSNUM => Class::Num,
            other => Class::Unknown(other),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Class::None => "None",
            Class::Elf32 => "ELF32",
            Class::Elf64 => "ELF64",
            Class::Num => "Num",
            Class::Unknown(_) => "Unknown",
        }
    }
}

/// Data encoding from `e_ident[EI_DATA]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataEncoding {
    LittleEndian,
    BigEndian,
    Unknown(u8),
}

impl DataEncoding {
    pub fn from_byte(b: u8) -> Self {
        match b {
            ELFDATA2LSB => DataEncoding::LittleEndian,
            ELFDATA2MSB => DataEncoding::BigEndian,
            other => DataEncoding::Unknown(other),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DataEncoding::LittleEndian => "little endian",
            DataEncoding::BigEndian => "big endian",
            DataEncoding::Unknown(_) => "unknown",
        }
    }

    /// Byte order used for every field after `e_ident`.
    ///
    /// Only `ELFDATA2LSB` selects little endian; an unrecognised encoding falls
    /// back to big endian, exactly like `ELFDATA2MSB`.
    pub fn byte_order(self) -> Endian {
        match self {
            DataEncoding::LittleEndian => Endian::Little,
            DataEncoding::BigEndian | DataEncoding::Unknown(_) => Endian::Big,
        }
    }
}

/// The 16-byte `e_ident` block at the start of every ELF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identification {
    /// All 16 raw bytes, magic included.
    pub magic: [u8; EI_NIDENT],
    pub class: Class,
    pub data: DataEncoding,
    pub version: u8,
}

impl Identification {
    /// Decodes the identification block from the start of `buf`.
    ///
    /// Single bytes carry no byte order, so this never depends on `EI_DATA`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let bytes = slice_at(buf, 0, EI_NIDENT, Structure::Identification)?;
        let mut magic = [0u8; EI_NIDENT];
        magic.copy_from_slice(bytes);

        let ident = Identification {
            magic,
            class: Class::from_byte(magic[EI_CLASS]),
            data: DataEncoding::from_byte(magic[EI_DATA]),
            version: magic[EI_VERSION],
        };

        if !ident.has_valid_magic() {
            log::warn!("Bad ELF magic {:02x?}", &magic[..ELF_MAGIC.len()]);
        }
        if let DataEncoding::Unknown(b) = ident.data {
            log::warn!("Unknown data encoding {b}; decoding as big endian");
        }
        if ident.class != Class::Elf64 {
            log::warn!(
                "Class is {}; decoding with the ELF64 layout anyway",
                ident.class.display_name()
            );
        }

        Ok(ident)
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic[..ELF_MAGIC.len()] == ELF_MAGIC
    }

    pub fn byte_order(&self) -> Endian {
        self.data.byte_order()
    }
}
