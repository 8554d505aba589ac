pub mod elf;

use crate::reader::Endian;

/// Where a table of fixed-size entries lives in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLocation {
    /// File offset of entry 0.
    pub offset: u64,
    /// Declared distance between consecutive entries.
    pub entry_size: u16,
    pub count: u16,
}

impl TableLocation {
    /// File offset of entry `index`, or `None` on overflow.
    pub fn entry_offset(&self, index: usize) -> Option<u64> {
        let index = u64::try_from(index).ok()?;
        index
            .checked_mul(u64::from(self.entry_size))?
            .checked_add(self.offset)
    }
}

/// What the table decoders need from an already decoded file header.
pub trait Header: std::fmt::Debug + Send + Sync {
    /// Byte order for every field after the identification block.
    fn byte_order(&self) -> Endian;

    /// Returns the virtual address of the entry point.
    fn entry_point(&self) -> u64;

    fn program_headers(&self) -> TableLocation;

    fn section_headers(&self) -> TableLocation;

    /// Index of the section holding section names.
    fn string_table_index(&self) -> u16;
}
