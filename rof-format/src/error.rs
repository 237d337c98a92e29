use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("Failed to open ROF file. Path: '{}'", .1.display())]
    OpenFailed(#[source] std::io::Error, PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Failed to read ROF data.")]
    Io(#[from] std::io::Error),

    #[error("Corrupt archive at offset {offset:#x}: {reason}")]
    CorruptArchive { offset: u64, reason: Corruption },
}

impl ReadError {
    #[inline(always)]
    pub(crate) fn corrupt(offset: u64, reason: Corruption) -> ReadError {
        ReadError::CorruptArchive { offset, reason }
    }

    /// Rebases an offset reported against an in-memory copy of a block.
    pub(crate) fn offset_by(self, base: u64) -> ReadError {
        match self {
            ReadError::CorruptArchive { offset, reason } => ReadError::CorruptArchive {
                offset: base + offset,
                reason,
            },
            e => e,
        }
    }

    /// The reason an archive was rejected, if it was rejected for its content
    /// rather than an I/O failure.
    pub fn corruption(&self) -> Option<&Corruption> {
        match self {
            ReadError::CorruptArchive { reason, .. } => Some(reason),
            ReadError::Io(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Corruption {
    #[error("unexpected end of archive while reading {wanted} bytes")]
    Truncated { wanted: usize },

    #[error("unknown entry kind {0}")]
    UnknownKind(u32),

    #[error("entry has an empty name")]
    EmptyName,

    #[error("name at {name_offset}+{name_length} lies outside the {table_length} byte name table")]
    NameOutOfRange {
        name_offset: u32,
        name_length: u32,
        table_length: u32,
    },

    #[error("name is not a null-terminated ASCII string")]
    InvalidName,

    #[error("directory block at {0:#x} is its own ancestor")]
    DirectoryCycle(u32),

    #[error("directory block at {0:#x} is referenced by more than one entry")]
    SharedDirectory(u32),

    #[error("entry '{0}' still holds a placeholder offset")]
    UnresolvedOffset(String),

    #[error("file '{name}' at {offset:#x}+{size} runs past the end of the archive")]
    FileOutOfRange { name: String, offset: u32, size: u32 },

    #[error("name table declares {declared} bytes but its entries use {actual}")]
    NameTableMismatch { declared: u32, actual: u64 },

    #[error("name of '{name}' starts at {actual} instead of {expected}")]
    NameNotPacked {
        name: String,
        expected: u64,
        actual: u32,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Name cannot be stored as ASCII. Path: '{}'", .0.display())]
    NonAsciiName(PathBuf),

    #[error("File of {size} bytes is too large to store. Path: '{}'", .path.display())]
    FileTooLarge { path: PathBuf, size: u64 },

    #[error("Directory has too many entries to store. Path: '{}'", .0.display())]
    TooManyEntries(PathBuf),

    #[error("Archive position {0:#x} cannot be addressed with 32-bit offsets.")]
    OffsetOverflow(u64),

    #[error("Failed to list directory. Path: '{}'", .1.display())]
    ReadDirFailed(#[source] std::io::Error, PathBuf),

    #[error("Failed to read source file. Path: '{}'", .1.display())]
    ReadFileFailed(#[source] std::io::Error, PathBuf),

    #[error("Failed to copy source file into the archive. Path: '{}'", .1.display())]
    CopyFailed(#[source] std::io::Error, PathBuf),

    #[error("Source file changed size while being archived. Path: '{}'", .0.display())]
    SourceChanged(PathBuf),

    #[error("Directory is reached more than once, likely through a symlink loop. Path: '{}'", .0.display())]
    DirectoryLoop(PathBuf),

    #[error("Failed to write ROF data.")]
    Io(#[from] std::io::Error),
}
