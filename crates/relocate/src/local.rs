use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::transfer::EntryTransfer;

/// A directory on the local filesystem receiving entries by file name.
///
/// Entries land at `<dir>/<file name of source>`; existing destination files
/// are overwritten so re-running an interrupted archive converges on the
/// same tree. The directory is created on first use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDirectory {
    dir: PathBuf,
}

impl LocalDirectory {
    /// Targets `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Destination directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Path an entry named like `source` would occupy.
    pub fn target_for(&self, source: &Path) -> io::Result<PathBuf> {
        let name = source.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' has no file name", source.display()),
            )
        })?;
        Ok(self.dir.join(name))
    }

    fn prepare(&self, source: &Path) -> io::Result<PathBuf> {
        let target = self.target_for(source)?;
        if target == source {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "source and destination are the same file",
            ));
        }
        fs::create_dir_all(&self.dir)?;
        Ok(target)
    }
}

impl EntryTransfer for LocalDirectory {
    fn destination(&self) -> String {
        self.dir.display().to_string()
    }

    fn copy_entry(&self, source: &Path) -> io::Result<()> {
        let target = self.prepare(source)?;
        copy_verified(source, &target)
    }

    fn move_entry(&self, source: &Path) -> io::Result<()> {
        let target = self.prepare(source)?;
        match fs::rename(source, &target) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Err(error),
            Err(error) => {
                tracing::debug!(
                    target: "archive::relocate",
                    source = %source.display(),
                    %error,
                    "rename failed; falling back to copy and remove"
                );
                copy_verified(source, &target)?;
                fs::remove_file(source)
            }
        }
    }
}

/// Copies a regular file, checks the copied length, and carries over the
/// modification and access times.
///
/// A short copy removes the partial destination and reports an error, so the
/// caller never deletes a source whose copy is incomplete.
pub fn copy_verified(source: &Path, target: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' is not a regular file", source.display()),
        ));
    }

    let copied = fs::copy(source, target)?;
    if copied != metadata.len() {
        let _ = fs::remove_file(target);
        return Err(io::Error::other(format!(
            "short copy to '{}': {copied} of {} bytes",
            target.display(),
            metadata.len()
        )));
    }

    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(target, atime, mtime)
}
