use std::io::{Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::{header::DirectoryHeader, record::Entry};

pub(crate) trait Serialize {
    fn write<W: Write + Seek>(&self, writer: &mut W) -> std::io::Result<()>;
}

impl Serialize for DirectoryHeader {
    fn write<W: Write + Seek>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u32::<LittleEndian>(self.item_count)?;
        writer.write_u32::<LittleEndian>(self.name_table_length)
    }
}

impl Serialize for Entry {
    fn write<W: Write + Seek>(&self, writer: &mut W) -> std::io::Result<()> {
        // The offset field comes first so a patch can target the entry start.
        writer.write_u32::<LittleEndian>(self.offset)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_u32::<LittleEndian>(self.kind.id())?;
        writer.write_u32::<LittleEndian>(self.name_length)?;
        writer.write_u32::<LittleEndian>(self.name_offset)
    }
}

/// Writes a name table slot: the ASCII bytes followed by a null terminator.
pub(crate) fn write_name<W: Write>(writer: &mut W, name: &str) -> std::io::Result<()> {
    writer.write_all(name.as_bytes())?;
    writer.write_u8(0)
}

/// Overwrites the u32 at `pos` and puts the cursor back where it was.
pub(crate) fn patch_u32_le<W: Write + Seek>(
    writer: &mut W,
    pos: u64,
    value: u32,
) -> std::io::Result<()> {
    let cur_index = writer.stream_position()?;
    writer.seek(SeekFrom::Start(pos))?;
    writer.write_u32::<LittleEndian>(value)?;
    writer.seek(SeekFrom::Start(cur_index))?;

    tracing::trace!(
        field = format_args!("{:#x}", pos),
        value = format_args!("{:#x}", value),
        "patched offset"
    );

    Ok(())
}
