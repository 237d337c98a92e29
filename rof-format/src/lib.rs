//! Reading and writing ROF archives.
//!
//! An archive is a tree of directory blocks. Each block holds a header, one
//! fixed-size entry per child and a table of null-terminated names; children
//! are addressed by absolute offset, with the root block at offset zero.

#[cfg(feature = "reader")]
mod de;
mod error;
mod file;
mod header;
mod record;
#[cfg(feature = "writer")]
mod ser;
#[cfg(feature = "reader")]
mod visitor;

pub use error::{Corruption, OpenError, ReadError, WriteError};
#[cfg(feature = "reader")]
pub use file::reader::{ArchiveStats, RofReader};
#[cfg(feature = "writer")]
pub use file::writer::{pack_to_vec, RofWriter};
pub use header::{DirectoryHeader, ENTRY_SIZE, HEADER_SIZE, PLACEHOLDER_OFFSET, ROOT_OFFSET};
pub use record::{Directory, DirectoryItem, Entry, EntryKind};
#[cfg(feature = "reader")]
pub use visitor::{TreePrinter, Visitor};
