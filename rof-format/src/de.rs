use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::{
    error::{Corruption, ReadError},
    header::DirectoryHeader,
    record::{Entry, EntryKind},
};

/// Turns a short read into a corruption report. Anything else stays an I/O error.
fn short_read(error: std::io::Error, offset: u64, wanted: usize) -> ReadError {
    if error.kind() == std::io::ErrorKind::UnexpectedEof {
        ReadError::corrupt(offset, Corruption::Truncated { wanted })
    } else {
        ReadError::Io(error)
    }
}

/// Read a u32 in little-endian format
pub(crate) fn read_u32_le<R: Read + Seek>(reader: &mut R) -> Result<u32, ReadError> {
    let start = reader.stream_position()?;
    reader
        .read_u32::<LittleEndian>()
        .map_err(|e| short_read(e, start, 4))
}

/// Reads the name of `entry` out of the name table starting at `table_offset`,
/// leaving the reader where it was found.
pub(crate) fn read_name_at<R: Read + Seek>(
    reader: &mut R,
    table_offset: u64,
    header: &DirectoryHeader,
    entry: &Entry,
) -> Result<String, ReadError> {
    let offset = table_offset + u64::from(entry.name_offset);

    // One byte is just the terminator.
    if entry.name_length < 2 {
        return Err(ReadError::corrupt(offset, Corruption::EmptyName));
    }

    let end = u64::from(entry.name_offset) + u64::from(entry.name_length);
    if end > u64::from(header.name_table_length) {
        return Err(ReadError::corrupt(
            offset,
            Corruption::NameOutOfRange {
                name_offset: entry.name_offset,
                name_length: entry.name_length,
                table_length: header.name_table_length,
            },
        ));
    }

    let previous = reader.stream_position()?;
    reader.seek(SeekFrom::Start(offset))?;

    let len = entry.name_length as usize;
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|e| short_read(e, offset, len))?;

    reader.seek(SeekFrom::Start(previous))?;

    // Stored length includes the terminator
    if buf.pop() != Some(0) || buf.contains(&0) || !buf.is_ascii() {
        return Err(ReadError::corrupt(offset, Corruption::InvalidName));
    }

    let name =
        String::from_utf8(buf).map_err(|_| ReadError::corrupt(offset, Corruption::InvalidName))?;

    tracing::debug!(
        start = format_args!("{:#x}", offset),
        bytes = len,
        %name,
        "deserialized name"
    );

    Ok(name)
}

pub(crate) trait DeserializeOwned {
    fn deserialize_owned<R: Read + Seek>(reader: &mut R) -> Result<Self, ReadError>
    where
        Self: Sized;
}

impl DeserializeOwned for DirectoryHeader {
    fn deserialize_owned<R: Read + Seek>(reader: &mut R) -> Result<Self, ReadError> {
        let start = reader.stream_position()?;
        let item_count = read_u32_le(reader)?;
        let name_table_length = read_u32_le(reader)?;

        tracing::debug!(
            start = format_args!("{:#x}", start),
            item_count,
            name_table_length,
            "deserialized DirectoryHeader"
        );

        Ok(DirectoryHeader {
            item_count,
            name_table_length,
        })
    }
}

impl DeserializeOwned for Entry {
    fn deserialize_owned<R: Read + Seek>(reader: &mut R) -> Result<Self, ReadError> {
        let start = reader.stream_position()?;
        let offset = read_u32_le(reader)?;
        let size = read_u32_le(reader)?;

        let kind_offset = reader.stream_position()?;
        let kind_id = read_u32_le(reader)?;
        let kind = EntryKind::from_id(kind_id)
            .ok_or_else(|| ReadError::corrupt(kind_offset, Corruption::UnknownKind(kind_id)))?;

        let name_length = read_u32_le(reader)?;
        let name_offset = read_u32_le(reader)?;

        let end = reader.stream_position()?;
        tracing::debug!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", end),
            bytes = end - start,
            offset = format_args!("{:#x}", offset),
            size,
            ?kind,
            "deserialized Entry"
        );

        Ok(Entry {
            offset,
            size,
            kind,
            name_length,
            name_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn entry(name_offset: u32, name_length: u32) -> Entry {
        Entry {
            offset: 0,
            size: 0,
            kind: EntryKind::File,
            name_length,
            name_offset,
        }
    }

    #[test]
    fn short_header_is_corrupt() {
        let mut cursor = Cursor::new(vec![1u8, 0, 0, 0, 9]);
        let err = DirectoryHeader::deserialize_owned(&mut cursor).unwrap_err();
        assert_eq!(err.corruption(), Some(&Corruption::Truncated { wanted: 4 }));
    }

    #[test]
    fn unknown_kind_is_corrupt() {
        let mut data = vec![];
        for value in &[8u32, 0, 7, 2, 0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        let err = Entry::deserialize_owned(&mut Cursor::new(data)).unwrap_err();
        assert_eq!(err.corruption(), Some(&Corruption::UnknownKind(7)));
    }

    #[test]
    fn name_read_restores_position() {
        let mut cursor = Cursor::new(b"xxxxab\0cd\0".to_vec());
        cursor.set_position(2);
        let header = DirectoryHeader {
            item_count: 2,
            name_table_length: 6,
        };

        let name = read_name_at(&mut cursor, 4, &header, &entry(3, 3)).unwrap();
        assert_eq!(name, "cd");
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn terminator_only_name_is_empty() {
        let mut cursor = Cursor::new(b"\0ab\0".to_vec());
        let header = DirectoryHeader {
            item_count: 2,
            name_table_length: 4,
        };

        let err = read_name_at(&mut cursor, 0, &header, &entry(0, 1)).unwrap_err();
        assert_eq!(err.corruption(), Some(&Corruption::EmptyName));

        let err = read_name_at(&mut cursor, 0, &header, &entry(0, 0)).unwrap_err();
        assert_eq!(err.corruption(), Some(&Corruption::EmptyName));
    }

    #[test]
    fn name_outside_table_is_corrupt() {
        let mut cursor = Cursor::new(b"ab\0cd\0".to_vec());
        let header = DirectoryHeader {
            item_count: 1,
            name_table_length: 3,
        };

        let err = read_name_at(&mut cursor, 0, &header, &entry(3, 3)).unwrap_err();
        assert!(matches!(
            err.corruption(),
            Some(Corruption::NameOutOfRange { .. })
        ));
    }

    #[test]
    fn name_without_terminator_is_corrupt() {
        let mut cursor = Cursor::new(b"abc".to_vec());
        let header = DirectoryHeader {
            item_count: 1,
            name_table_length: 3,
        };

        let err = read_name_at(&mut cursor, 0, &header, &entry(0, 3)).unwrap_err();
        assert_eq!(err.corruption(), Some(&Corruption::InvalidName));
    }

    #[test]
    fn non_ascii_name_is_corrupt() {
        let mut cursor = Cursor::new(vec![0xc3, 0xa9, 0]);
        let header = DirectoryHeader {
            item_count: 1,
            name_table_length: 3,
        };

        let err = read_name_at(&mut cursor, 0, &header, &entry(0, 3)).unwrap_err();
        assert_eq!(err.corruption(), Some(&Corruption::InvalidName));
    }
}
