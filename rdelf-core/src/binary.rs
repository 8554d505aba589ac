use crate::error::Result;
use crate::header::elf::ElfHeader;
use crate::{ProgramHeader, SectionHeader};
use anyhow::Context;

/// An ELF file loaded into memory with its header already decoded.
///
/// The header is decoded once on load; the two tables are decoded on demand so
/// a damaged section table does not prevent printing the program headers.
pub struct Binary {
    pub path: String,
    pub bytes: Vec<u8>,
    pub header: ElfHeader,
}

impl Binary {
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        log::info!("Read {} bytes from {}", bytes.len(), path.display());

        let mut bin = Self::from_bytes(bytes)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        bin.path = path.display().to_string();
        Ok(bin)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let header = ElfHeader::parse(&bytes)?;
        Ok(Self {
            path: String::new(),
            bytes,
            header,
        })
    }

    pub fn program_headers(&self) -> Result<Vec<ProgramHeader>> {
        ProgramHeader::parse_table(&self.bytes, &self.header)
    }

    pub fn section_headers(&self) -> Result<Vec<SectionHeader>> {
        SectionHeader::parse_table(&self.bytes, &self.header)
    }
}
