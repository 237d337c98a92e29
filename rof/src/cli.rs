use std::path::PathBuf;

use structopt::StructOpt;

use crate::error::{Error, Result};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "ls-rof",
    about = "List the directory tree stored in a ROF archive.",
    usage = "ls-rof [FLAGS] <rof-file>"
)]
pub struct ListArgs {
    #[structopt(short, long, help = "Show verbose output")]
    pub verbose: bool,

    #[structopt(name = "rof-file", parse(from_os_str), help = "Path to the ROF archive")]
    pub archive: PathBuf,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "pack-rof",
    about = "Pack a directory tree into a new ROF archive.",
    usage = "pack-rof [FLAGS] <source-directory> <rof-file>"
)]
pub struct PackArgs {
    #[structopt(short, long, help = "Show verbose output")]
    pub verbose: bool,

    #[structopt(
        name = "source-directory",
        parse(from_os_str),
        help = "Directory to pack"
    )]
    pub source: PathBuf,

    #[structopt(
        name = "rof-file",
        parse(from_os_str),
        help = "Path of the ROF archive to write; replaced if it exists"
    )]
    pub archive: PathBuf,
}

/// Parses the process arguments. A bad invocation, or a request for help,
/// becomes a usage error carrying the text clap would have printed.
pub fn parse_args<T: StructOpt>() -> Result<T> {
    T::from_iter_safe(wild::args_os()).map_err(|e| Error::Usage(e.message))
}
