use std::fs;
use std::io;
use std::path::Path;

/// A destination that can receive entries one at a time.
///
/// Local directories and remote hosts both implement this; the
/// [`Relocator`](crate::Relocator) drives either through the same policy
/// logic.
pub trait EntryTransfer {
    /// Human-readable destination used in log lines.
    fn destination(&self) -> String;

    /// Places a copy of `source` at the destination, keeping the source.
    fn copy_entry(&self, source: &Path) -> io::Result<()>;

    /// Places `source` at the destination and removes it locally.
    ///
    /// The default copies first and removes the source only after the copy
    /// returned successfully, so an interruption leaves at least one
    /// complete copy.
    fn move_entry(&self, source: &Path) -> io::Result<()> {
        self.copy_entry(source)?;
        remove_entry(source)
    }
}

/// Removes a file, symbolic link, or directory tree without following links.
pub fn remove_entry(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
