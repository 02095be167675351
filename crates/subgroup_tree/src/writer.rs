use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::subgroup::Subgroup;

/// Buffered result sink: opened once before a run, one line per accepted
/// subgroup, flushed once by [`finish`](Self::finish).
pub struct ResultWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl ResultWriter {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write_subgroup(&mut self, subgroup: &Subgroup) -> std::io::Result<()> {
        writeln!(self.out, "{subgroup}")?;
        self.written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and close. Returns the number of lines written.
    pub fn finish(mut self) -> std::io::Result<usize> {
        self.out.flush()?;
        tracing::debug!(path = %self.path.display(), lines = self.written, "closed result file");
        Ok(self.written)
    }
}
