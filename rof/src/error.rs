use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad invocation; reported on stdout without failing the process.
    #[error("{0}")]
    Usage(String),

    #[error("Cannot open archive `{}`", .path.display())]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: rof_format::OpenError,
    },

    #[error("Cannot read archive `{}`", .path.display())]
    ReadArchive {
        path: PathBuf,
        #[source]
        source: rof_format::ReadError,
    },

    #[error("Cannot write listing")]
    WriteOutput {
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create archive `{}`", .path.display())]
    CreateArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot pack directory `{}`", .path.display())]
    PackDirectory {
        path: PathBuf,
        #[source]
        source: rof_format::WriteError,
    },

    #[error("Cannot finish archive `{}`", .path.display())]
    FinishArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot canonicalize path `{}`", .path.display())]
    CanonicalizePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Cowardly refusing to write archive `{}` inside the directory being packed",
        .path.display()
    )]
    ArchiveInsideSource { path: PathBuf },
}
