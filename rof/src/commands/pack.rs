use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use humansize::{file_size_opts as options, FileSize};
use rof_format::RofWriter;

use crate::cli::PackArgs;
use crate::error::{Error, Result};

/// Refuses an output location inside the tree being packed, since the archive
/// would end up listing itself.
fn ensure_outside_source(source: &Path, archive: &Path) -> Result<()> {
    let source = source
        .canonicalize()
        .map_err(|e| Error::CanonicalizePath {
            path: source.to_path_buf(),
            source: e,
        })?;

    let parent = match archive.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // A missing parent is reported when the archive is created.
    let parent = match parent.canonicalize() {
        Ok(parent) => parent,
        Err(_) => return Ok(()),
    };

    if parent.starts_with(&source) {
        return Err(Error::ArchiveInsideSource {
            path: archive.to_path_buf(),
        });
    }

    Ok(())
}

pub fn run(args: PackArgs) -> Result<()> {
    if !args.source.is_dir() {
        return Err(Error::Usage("Error: input path does not exist.".into()));
    }

    ensure_outside_source(&args.source, &args.archive)?;

    let mut writer = RofWriter::create(&args.archive).map_err(|source| Error::CreateArchive {
        path: args.archive.clone(),
        source,
    })?;

    writer
        .add_directory(&args.source)
        .map_err(|source| Error::PackDirectory {
            path: args.source.clone(),
            source,
        })?;

    let mut file = writer.finish().map_err(|source| Error::FinishArchive {
        path: args.archive.clone(),
        source,
    })?;

    let length = file
        .seek(SeekFrom::End(0))
        .map_err(|source| Error::FinishArchive {
            path: args.archive.clone(),
            source,
        })?;

    tracing::info!(
        source = %args.source.display(),
        archive = %args.archive.display(),
        size = %length.file_size(options::BINARY).unwrap_or_else(|_| length.to_string()),
        "packed archive"
    );

    Ok(())
}
