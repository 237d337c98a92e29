use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use crate::{
    de::{read_name_at, DeserializeOwned},
    error::{Corruption, OpenError, ReadError},
    header::{DirectoryHeader, HEADER_SIZE, PLACEHOLDER_OFFSET, ROOT_OFFSET},
    record::{Directory, DirectoryItem, Entry, EntryKind},
    visitor::Visitor,
};

/// Totals gathered while validating an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Directory blocks, the root included.
    pub directories: u64,
    pub files: u64,
    pub file_bytes: u64,
}

#[derive(Debug)]
pub struct RofReader<R> {
    pub(crate) file: R,
}

/// A directory whose subdirectories are still being walked.
struct Frame {
    offset: u32,
    depth: usize,
    directories: std::vec::IntoIter<DirectoryItem>,
    files: Vec<DirectoryItem>,
}

/// Accepts everything; used when only the per-block checks matter.
struct Ignore;

impl Visitor for Ignore {
    fn directory(&mut self, _name: &str, _depth: usize) -> std::io::Result<()> {
        Ok(())
    }
}

impl RofReader<BufReader<File>> {
    /// Opens an existing ROF file. Nothing is read until the archive is walked.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<RofReader<BufReader<File>>, OpenError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| OpenError::OpenFailed(e, path.to_path_buf()))?;

        Ok(RofReader::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> RofReader<R> {
    pub fn new(file: R) -> RofReader<R> {
        RofReader { file }
    }

    pub fn into_inner(self) -> R {
        self.file
    }

    /// Reads the directory block at `offset` along with every child's name.
    ///
    /// The entry and name tables are pulled in with a single read; names are
    /// then resolved against that copy instead of seeking around the archive.
    pub fn read_directory(&mut self, offset: u32) -> Result<Directory, ReadError> {
        let file = &mut self.file;
        file.seek(SeekFrom::Start(u64::from(offset)))?;

        let header = DirectoryHeader::deserialize_owned(file)?;
        let start = file.stream_position()?;
        let len = header.entries_length() + u64::from(header.name_table_length);

        // Counts are untrusted: `take` stops at the end of the archive, so
        // nothing larger than the file itself is ever buffered.
        let mut block = Vec::new();
        (&mut *file).take(len).read_to_end(&mut block)?;
        let got = block.len() as u64;
        if got < len {
            return Err(ReadError::corrupt(
                start + got,
                Corruption::Truncated {
                    wanted: (len - got) as usize,
                },
            ));
        }

        let table_offset = header.entries_length();
        let mut block = Cursor::new(block);
        let mut items = Vec::new();
        for _ in 0..header.item_count {
            let entry = Entry::deserialize_owned(&mut block).map_err(|e| e.offset_by(start))?;
            let name = read_name_at(&mut block, table_offset, &header, &entry)
                .map_err(|e| e.offset_by(start))?;
            items.push(DirectoryItem { name, entry });
        }

        tracing::debug!(
            start = format_args!("{:#x}", offset),
            end = format_args!("{:#x}", start + len),
            items = items.len(),
            "deserialized Directory"
        );

        Ok(Directory {
            offset,
            header,
            items,
        })
    }

    /// Walks the directory block at `offset`, reporting its subdirectories
    /// (each followed by its own contents) and then its files to `visitor`.
    pub fn parse_directory<V: Visitor>(
        &mut self,
        offset: u32,
        depth: usize,
        visitor: &mut V,
    ) -> Result<(), ReadError> {
        self.traverse(offset, depth, visitor, |_| Ok(()))
    }

    /// Walks the whole archive from the root block.
    pub fn walk<V: Visitor>(&mut self, visitor: &mut V) -> Result<(), ReadError> {
        self.parse_directory(ROOT_OFFSET, 0, visitor)
    }

    /// Checks every block reachable from the root against the layout rules the
    /// writer follows: densely packed name tables, resolved offsets, file data
    /// inside the archive and every directory block used exactly once.
    pub fn validate(&mut self) -> Result<ArchiveStats, ReadError> {
        let archive_len = self.file.seek(SeekFrom::End(0))?;
        let mut stats = ArchiveStats::default();
        self.traverse(ROOT_OFFSET, 0, &mut Ignore, |directory| {
            check_block(directory, archive_len, &mut stats)
        })?;

        tracing::debug!(
            directories = stats.directories,
            files = stats.files,
            file_bytes = stats.file_bytes,
            "validated archive"
        );

        Ok(stats)
    }

    /// Depth-first walk on an explicit stack, so nesting depth is bounded by
    /// the archive's size rather than the thread's stack. Each block may be
    /// entered once; writers never share blocks between entries.
    fn traverse<V, F>(
        &mut self,
        offset: u32,
        depth: usize,
        visitor: &mut V,
        mut inspect: F,
    ) -> Result<(), ReadError>
    where
        V: Visitor,
        F: FnMut(&Directory) -> Result<(), ReadError>,
    {
        let mut visited = HashSet::new();
        let mut open = HashSet::new();

        let root = self.enter(offset, depth, &mut inspect)?;
        visited.insert(offset);
        open.insert(offset);
        let mut stack = vec![root];

        while let Some(frame) = stack.last_mut() {
            match frame.directories.next() {
                Some(item) => {
                    let child = item.offset();
                    let depth = frame.depth;

                    if open.contains(&child) {
                        return Err(ReadError::corrupt(
                            u64::from(child),
                            Corruption::DirectoryCycle(child),
                        ));
                    }
                    if !visited.insert(child) {
                        return Err(ReadError::corrupt(
                            u64::from(child),
                            Corruption::SharedDirectory(child),
                        ));
                    }

                    visitor.directory(item.name(), depth)?;
                    let next = self.enter(child, depth + 1, &mut inspect)?;
                    open.insert(child);
                    stack.push(next);
                }
                None => {
                    let frame = match stack.pop() {
                        Some(frame) => frame,
                        None => break,
                    };
                    for item in frame.files.iter() {
                        visitor.file(item.name(), item.offset(), item.size(), frame.depth)?;
                    }
                    open.remove(&frame.offset);
                }
            }
        }

        Ok(())
    }

    fn enter<F>(&mut self, offset: u32, depth: usize, inspect: &mut F) -> Result<Frame, ReadError>
    where
        F: FnMut(&Directory) -> Result<(), ReadError>,
    {
        let directory = self.read_directory(offset)?;
        inspect(&directory)?;

        let (directories, files): (Vec<_>, Vec<_>) = directory
            .items
            .into_iter()
            .partition(|x| x.entry.is_directory());

        Ok(Frame {
            offset,
            depth,
            directories: directories.into_iter(),
            files,
        })
    }
}

fn check_block(
    directory: &Directory,
    archive_len: u64,
    stats: &mut ArchiveStats,
) -> Result<(), ReadError> {
    let offset = directory.offset;
    let header = directory.header;
    let table_offset = u64::from(offset) + HEADER_SIZE + header.entries_length();
    stats.directories += 1;

    let mut expected = 0u64;
    for item in directory.items.iter() {
        if u64::from(item.entry.name_offset) != expected {
            return Err(ReadError::corrupt(
                table_offset + u64::from(item.entry.name_offset),
                Corruption::NameNotPacked {
                    name: item.name.clone(),
                    expected,
                    actual: item.entry.name_offset,
                },
            ));
        }
        expected += u64::from(item.entry.name_length);
    }

    if expected != u64::from(header.name_table_length) {
        return Err(ReadError::corrupt(
            u64::from(offset),
            Corruption::NameTableMismatch {
                declared: header.name_table_length,
                actual: expected,
            },
        ));
    }

    for item in directory.items.iter() {
        if item.offset() == PLACEHOLDER_OFFSET {
            return Err(ReadError::corrupt(
                u64::from(offset),
                Corruption::UnresolvedOffset(item.name.clone()),
            ));
        }

        if item.kind() == EntryKind::File {
            if u64::from(item.offset()) + u64::from(item.size()) > archive_len {
                return Err(ReadError::corrupt(
                    u64::from(item.offset()),
                    Corruption::FileOutOfRange {
                        name: item.name.clone(),
                        offset: item.offset(),
                        size: item.size(),
                    },
                ));
            }
            stats.files += 1;
            stats.file_bytes += u64::from(item.size());
        }
    }

    Ok(())
}
