pub mod binary;
pub mod error;
pub mod header;
pub mod ident;
pub mod program_header;
mod reader;
pub mod sections;

pub use binary::*;
pub use error::{Error, Result, Structure};
pub use header::elf::{ElfHeader, Machine, ObjectType};
pub use header::{Header, TableLocation};
pub use ident::{Class, DataEncoding, Identification};
pub use program_header::{ProgramHeader, SegmentFlags, SegmentType};
pub use reader::Endian;
pub use sections::{SectionFlags, SectionHeader, SectionType};
