use std::collections::HashSet;
use std::convert::TryFrom;
use std::fs::{File, OpenOptions};
use std::io::{prelude::*, BufWriter, Cursor};
use std::path::{Path, PathBuf};

use crate::{
    error::WriteError,
    header::{DirectoryHeader, PLACEHOLDER_OFFSET},
    record::{Entry, EntryKind},
    ser::{patch_u32_le, write_name, Serialize},
};

/// A child of a source directory, captured before anything is written.
#[derive(Debug)]
struct SourceItem {
    name: String,
    path: PathBuf,
    kind: EntryKind,
    size: u32,
}

fn list_source_items(directory: &Path) -> Result<Vec<SourceItem>, WriteError> {
    let read_dir = std::fs::read_dir(directory)
        .map_err(|e| WriteError::ReadDirFailed(e, directory.to_path_buf()))?;

    let mut items = vec![];
    for dir_entry in read_dir {
        let dir_entry =
            dir_entry.map_err(|e| WriteError::ReadDirFailed(e, directory.to_path_buf()))?;
        let path = dir_entry.path();

        let name = match dir_entry.file_name().into_string() {
            Ok(name) if name.is_ascii() && !name.contains('\0') => name,
            _ => return Err(WriteError::NonAsciiName(path)),
        };

        // Follows symlinks, so a link to a directory is archived as one.
        let meta =
            std::fs::metadata(&path).map_err(|e| WriteError::ReadFileFailed(e, path.clone()))?;

        let (kind, size) = if meta.is_dir() {
            (EntryKind::Directory, 0)
        } else {
            let size = u32::try_from(meta.len()).map_err(|_| WriteError::FileTooLarge {
                path: path.clone(),
                size: meta.len(),
            })?;
            (EntryKind::File, size)
        };

        items.push(SourceItem {
            name,
            path,
            kind,
            size,
        });
    }

    // Byte-wise ordering keeps the layout reproducible across platforms.
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(items)
}

#[derive(Debug)]
pub struct RofWriter<W> {
    pub(crate) file: W,
}

impl RofWriter<BufWriter<File>> {
    /// Creates a ROF file for writing, replacing any existing file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<RofWriter<BufWriter<File>>> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())
            .map(|file| RofWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write + Seek> RofWriter<W> {
    pub fn new(file: W) -> RofWriter<W> {
        RofWriter { file }
    }

    /// Flushes and hands back the underlying sink.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.file.flush()?;
        Ok(self.file)
    }

    #[inline(always)]
    fn next_write_addr(&mut self) -> Result<u32, WriteError> {
        let pos = self.file.stream_position()?;
        u32::try_from(pos).map_err(|_| WriteError::OffsetOverflow(pos))
    }

    /// Serializes `directory` and everything beneath it at the current
    /// position, returning the offset of its block header.
    ///
    /// Each block is written with placeholder child offsets; every child is
    /// then appended and its entry patched in place once its position is known.
    pub fn add_directory<P: AsRef<Path>>(&mut self, directory: P) -> Result<u32, WriteError> {
        let mut ancestors = HashSet::new();
        self.add_directory_inner(directory.as_ref(), &mut ancestors)
    }

    /// `ancestors` holds the canonical path of every directory currently being
    /// packed, so a symlink back up the tree is caught on its first repeat.
    fn add_directory_inner(
        &mut self,
        directory: &Path,
        ancestors: &mut HashSet<PathBuf>,
    ) -> Result<u32, WriteError> {
        let canonical = directory
            .canonicalize()
            .map_err(|e| WriteError::ReadDirFailed(e, directory.to_path_buf()))?;
        if ancestors.contains(&canonical) {
            return Err(WriteError::DirectoryLoop(directory.to_path_buf()));
        }

        let directory_offset = self.next_write_addr()?;
        let items = list_source_items(directory)?;

        let item_count = u32::try_from(items.len())
            .map_err(|_| WriteError::TooManyEntries(directory.to_path_buf()))?;
        let name_table_length = items.iter().map(|x| x.name.len() as u64 + 1).sum::<u64>();
        let name_table_length = u32::try_from(name_table_length)
            .map_err(|_| WriteError::TooManyEntries(directory.to_path_buf()))?;

        DirectoryHeader {
            item_count,
            name_table_length,
        }
        .write(&mut self.file)?;

        // Where each entry's offset field lives, in item order.
        let mut offset_fields = Vec::with_capacity(items.len());
        let mut name_offset = 0u32;

        for item in items.iter() {
            let name_length = item.name.len() as u32 + 1;
            offset_fields.push(self.file.stream_position()?);

            Entry {
                offset: PLACEHOLDER_OFFSET,
                size: item.size,
                kind: item.kind,
                name_length,
                name_offset,
            }
            .write(&mut self.file)?;

            name_offset += name_length;
        }

        for item in items.iter() {
            write_name(&mut self.file, &item.name)?;
        }

        tracing::debug!(
            start = format_args!("{:#x}", directory_offset),
            items = item_count,
            name_table_length,
            path = %directory.display(),
            "serialized DirectoryHeader"
        );

        ancestors.insert(canonical.clone());
        for (item, field) in items.iter().zip(offset_fields) {
            let offset = match item.kind {
                EntryKind::Directory => self.add_directory_inner(&item.path, ancestors)?,
                EntryKind::File => self.append_file(item)?,
            };

            patch_u32_le(&mut self.file, field, offset)?;
        }
        ancestors.remove(&canonical);

        Ok(directory_offset)
    }

    fn append_file(&mut self, item: &SourceItem) -> Result<u32, WriteError> {
        let file_offset = self.next_write_addr()?;

        let source =
            File::open(&item.path).map_err(|e| WriteError::ReadFileFailed(e, item.path.clone()))?;
        let mut source = source.take(u64::from(item.size));
        let copied = std::io::copy(&mut source, &mut self.file)
            .map_err(|e| WriteError::CopyFailed(e, item.path.clone()))?;

        // The entry already promised `size` bytes.
        if copied != u64::from(item.size) {
            return Err(WriteError::SourceChanged(item.path.clone()));
        }

        tracing::debug!(
            start = format_args!("{:#x}", file_offset),
            bytes = copied,
            path = %item.path.display(),
            "appended file"
        );

        Ok(file_offset)
    }
}

/// Packs `directory` into an in-memory archive.
pub fn pack_to_vec<P: AsRef<Path>>(directory: P) -> Result<Vec<u8>, WriteError> {
    let mut writer = RofWriter::new(Cursor::new(Vec::new()));
    writer.add_directory(directory)?;
    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn u32_at(data: &[u8], pos: usize) -> u32 {
        u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
    }

    #[test]
    fn empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data = pack_to_vec(dir.path()).unwrap();
        assert_eq!(data, vec![0u8; 8]);
    }

    #[test]
    fn sample_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"hi").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), b"bye").unwrap();

        let data = pack_to_vec(dir.path()).unwrap();

        // Root header
        assert_eq!(u32_at(&data, 0), 2);
        assert_eq!(u32_at(&data, 4), 10);

        // a.txt entry, content right after the root block
        assert_eq!(u32_at(&data, 8), 0x3a);
        assert_eq!(u32_at(&data, 12), 2);
        assert_eq!(u32_at(&data, 16), 0);
        assert_eq!(u32_at(&data, 20), 6);
        assert_eq!(u32_at(&data, 24), 0);

        // sub entry
        assert_eq!(u32_at(&data, 28), 0x3c);
        assert_eq!(u32_at(&data, 32), 0);
        assert_eq!(u32_at(&data, 36), 1);
        assert_eq!(u32_at(&data, 40), 4);
        assert_eq!(u32_at(&data, 44), 6);

        assert_eq!(&data[48..58], b"a.txt\0sub\0");
        assert_eq!(&data[58..60], b"hi");

        // sub block
        assert_eq!(u32_at(&data, 60), 1);
        assert_eq!(u32_at(&data, 64), 6);
        assert_eq!(u32_at(&data, 68), 0x5e);
        assert_eq!(&data[88..94], b"b.txt\0");
        assert_eq!(&data[94..], b"bye");
    }

    #[test]
    fn sorts_names_bytewise() {
        let dir = tempfile::tempdir().unwrap();
        for name in &["b", "C", "a", "_"] {
            fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }

        let data = pack_to_vec(dir.path()).unwrap();
        let table_start = 8 + 4 * 20;
        assert_eq!(&data[table_start..table_start + 8], b"C\0_\0a\0b\0");
    }

    #[test]
    fn starts_at_current_position() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x"), b"1").unwrap();

        let mut cursor = Cursor::new(vec![]);
        cursor.write_all(b"pad").unwrap();

        let mut writer = RofWriter::new(cursor);
        let offset = writer.add_directory(dir.path()).unwrap();
        assert_eq!(offset, 3);

        let data = writer.finish().unwrap().into_inner();
        // Header, one entry, "x\0"
        assert_eq!(u32_at(&data, 3 + 8), 3 + 8 + 20 + 2);
        assert_eq!(data.last(), Some(&b'1'));
    }

    #[cfg(unix)]
    #[test]
    fn rejects_non_ascii_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("caf\u{e9}"), b"").unwrap();

        let err = pack_to_vec(dir.path()).unwrap_err();
        assert!(matches!(err, WriteError::NonAsciiName(_)));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("a"), b"a").unwrap();
        std::os::unix::fs::symlink("..", dir.path().join("sub").join("up")).unwrap();

        let err = pack_to_vec(dir.path()).unwrap_err();
        match err {
            WriteError::DirectoryLoop(path) => {
                assert_eq!(path, dir.path().join("sub").join("up"));
            }
            e => panic!("unexpected error: {:?}", e),
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_sibling_is_packed_twice() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real").join("x"), b"x").unwrap();
        std::os::unix::fs::symlink("real", dir.path().join("link")).unwrap();

        let data = pack_to_vec(dir.path()).unwrap();
        let mut reader = crate::RofReader::new(Cursor::new(data));
        let mut printer = crate::TreePrinter::new(vec![]);
        reader.walk(&mut printer).unwrap();
        assert_eq!(printer.into_inner(), b"link:\n  x\nreal:\n  x\n");
    }

    #[test]
    fn missing_source_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = pack_to_vec(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, WriteError::ReadDirFailed(..)));
    }
}
