use std::io::{BufWriter, Write};

use rof_format::{RofReader, TreePrinter};

use crate::cli::ListArgs;
use crate::error::{Error, Result};

pub fn run(args: ListArgs) -> Result<()> {
    if !args.archive.is_file() {
        return Err(Error::Usage(
            "Error: first argument should be a path to a ROF file.".into(),
        ));
    }

    let mut reader = RofReader::open(&args.archive).map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    tracing::debug!(path = %args.archive.display(), "listing archive");

    let stdout = std::io::stdout();
    let mut printer = TreePrinter::new(BufWriter::new(stdout.lock()));

    reader
        .walk(&mut printer)
        .map_err(|source| Error::ReadArchive {
            path: args.archive.clone(),
            source,
        })?;

    printer
        .into_inner()
        .flush()
        .map_err(|source| Error::WriteOutput { source })
}
