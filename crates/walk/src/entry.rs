use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Coarse classification of a walked entry, taken from `symlink_metadata`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory; the walker descends into it.
    Directory,
    /// A regular file.
    File,
    /// A symbolic link. Links are reported, never followed.
    Symlink,
    /// Sockets, FIFOs, and device nodes.
    Other,
}

impl EntryKind {
    pub(crate) fn of(metadata: &fs::Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Result of a traversal step.
#[derive(Debug)]
pub struct TreeEntry {
    pub(crate) full_path: PathBuf,
    pub(crate) relative_path: PathBuf,
    pub(crate) metadata: fs::Metadata,
    pub(crate) depth: usize,
    pub(crate) is_root: bool,
}

impl TreeEntry {
    /// Returns the path to the entry, rooted where the walk was rooted.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Returns the path relative to the traversal root.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Metadata captured without following links.
    #[must_use]
    pub fn metadata(&self) -> &fs::Metadata {
        &self.metadata
    }

    /// Classification of the entry.
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        EntryKind::of(&self.metadata)
    }

    /// Final path component; `None` for the root entry.
    #[must_use]
    pub fn file_name(&self) -> Option<&OsStr> {
        if self.is_root {
            None
        } else {
            self.relative_path.file_name()
        }
    }

    /// Depth relative to the root (root depth is `0`).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Indicates whether this entry corresponds to the traversal root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.is_root
    }
}
