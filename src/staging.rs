//! Output files that only appear under their final name once complete.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

/// A file written under a temporary sibling name and renamed onto its
/// destination by [`StagedFile::commit`].
///
/// If dropped without being committed, the temporary file is removed and
/// whatever already lives at the destination is left alone.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    dest: PathBuf,
}

impl StagedFile {
    pub fn create(dest: impl Into<PathBuf>) -> io::Result<Self> {
        let dest = dest.into();
        let dir = match dest.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let name = dest
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = tempfile::Builder::new()
            .prefix(&format!("{name}."))
            .suffix(".tmp")
            .tempfile_in(dir)?;
        Ok(Self { file, dest })
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub fn tmp(&self) -> &Path {
        self.file.path()
    }

    /// Syncs the data to disk and moves it onto the destination path,
    /// replacing any earlier file there.
    pub fn commit(mut self) -> io::Result<PathBuf> {
        self.file.flush()?;
        self.file.as_file().sync_all()?;
        // A failed persist hands the temp file back and dropping it removes it.
        self.file.persist(&self.dest).map_err(|e| e.error)?;
        debug!("committed {}", self.dest.display());
        Ok(self.dest)
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
