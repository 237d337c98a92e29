use crate::header::DirectoryHeader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum EntryKind {
    File = 0,
    Directory = 1,
}

impl EntryKind {
    #[inline(always)]
    pub fn id(self) -> u32 {
        self as u32
    }

    #[inline(always)]
    pub fn from_id(id: u32) -> Option<EntryKind> {
        match id {
            0 => Some(EntryKind::File),
            1 => Some(EntryKind::Directory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Absolute position of the file data, or of the child's directory block.
    pub offset: u32,

    /// Length of the file data. Always zero for directories.
    pub size: u32,

    pub kind: EntryKind,

    /// Length of the name in the name table, including the null terminator.
    pub name_length: u32,

    /// Position of the name relative to the start of the name table.
    pub name_offset: u32,
}

impl Entry {
    #[inline(always)]
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    #[inline(always)]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// An entry together with its name resolved from the name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryItem {
    pub name: String,
    pub entry: Entry,
}

impl DirectoryItem {
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn offset(&self) -> u32 {
        self.entry.offset
    }

    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.entry.size
    }

    #[inline(always)]
    pub fn kind(&self) -> EntryKind {
        self.entry.kind
    }
}

/// A directory block as read from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Absolute position of the block header.
    pub offset: u32,
    pub header: DirectoryHeader,
    /// Children in on-disk order.
    pub items: Vec<DirectoryItem>,
}

impl Directory {
    pub fn directories(&self) -> impl Iterator<Item = &DirectoryItem> {
        self.items.iter().filter(|x| x.entry.is_directory())
    }

    pub fn files(&self) -> impl Iterator<Item = &DirectoryItem> {
        self.items.iter().filter(|x| x.entry.is_file())
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
