use std::io::Write;

/// Indentation per nesting level in a printed tree.
const INDENT_WIDTH: usize = 2;

/// Receives the children of each directory block as an archive is walked.
///
/// Directories are reported before files within every block, and a directory's
/// own children are reported at `depth + 1` immediately after it.
pub trait Visitor {
    fn directory(&mut self, name: &str, depth: usize) -> std::io::Result<()>;

    /// Called with the location of a file's content. The default ignores it;
    /// an extractor would read `size` bytes at `offset`.
    fn file(&mut self, name: &str, offset: u32, size: u32, depth: usize) -> std::io::Result<()> {
        let _ = (name, offset, size, depth);
        Ok(())
    }
}

/// Prints an indented listing: `name:` for directories, `name` for files.
#[derive(Debug)]
pub struct TreePrinter<W> {
    out: W,
}

impl<W: Write> TreePrinter<W> {
    pub fn new(out: W) -> TreePrinter<W> {
        TreePrinter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Visitor for TreePrinter<W> {
    fn directory(&mut self, name: &str, depth: usize) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{:indent$}{}:",
            "",
            name,
            indent = depth * INDENT_WIDTH
        )
    }

    fn file(&mut self, name: &str, _offset: u32, _size: u32, depth: usize) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{:indent$}{}",
            "",
            name,
            indent = depth * INDENT_WIDTH
        )
    }
}
