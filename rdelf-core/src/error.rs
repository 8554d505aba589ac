use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The on-disk structure a decode step was working on when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Structure {
    Identification,
    ElfHeader,
    /// Entry index within the program header table.
    ProgramHeader(usize),
    /// Entry index within the section header table.
    SectionHeader(usize),
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Structure::Identification => f.write_str("identification block"),
            Structure::ElfHeader => f.write_str("ELF header"),
            Structure::ProgramHeader(i) => write!(f, "program header [{i}]"),
            Structure::SectionHeader(i) => write!(f, "section header [{i}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The buffer ends before the fixed layout of `structure` does.
    Truncated {
        structure: Structure,
        offset: u64,
        needed: usize,
        available: usize,
    },
    /// `offset + index * entry_size` does not fit in the address space.
    OffsetOverflow { structure: Structure },
}

impl Error {
    pub fn structure(&self) -> Structure {
        match self {
            Error::Truncated { structure, .. } | Error::OffsetOverflow { structure } => {
                *structure
            }
        }
    }

    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::Truncated { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Truncated {
                structure,
                offset,
                needed,
                available,
            } => write!(
                f,
                "truncated {structure}: need {needed} bytes at offset {offset:#x}, only {available} available"
            ),
            Error::OffsetOverflow { structure } => {
                write!(f, "offset of {structure} overflows the file address space")
            }
        }
    }
}

impl std::error::Error for Error {}
