/// Every archive starts with the root directory block.
pub const ROOT_OFFSET: u32 = 0;

/// Size of a directory block header: `item_count` followed by `name_table_length`.
pub const HEADER_SIZE: u64 = 8;

/// Size of a single entry record: five little-endian `u32` fields.
pub const ENTRY_SIZE: u64 = 20;

/// Value written into an entry's `offset` field until the child has been
/// appended and its real position is known.
pub const PLACEHOLDER_OFFSET: u32 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryHeader {
    /// Number of direct children in the block.
    pub item_count: u32,

    /// Total bytes of the name table trailing the entry records.
    pub name_table_length: u32,
}

impl DirectoryHeader {
    /// Length of the entry records between the header and the name table.
    #[inline(always)]
    pub fn entries_length(&self) -> u64 {
        u64::from(self.item_count) * ENTRY_SIZE
    }

    /// Length of the whole block, header and name table included.
    #[inline(always)]
    pub fn block_length(&self) -> u64 {
        HEADER_SIZE + self.entries_length() + u64::from(self.name_table_length)
    }
}
