use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use crate::entry::{EntryKind, TreeEntry};
use crate::error::WalkError;

/// Configures a traversal rooted at a specific path.
#[derive(Clone, Debug)]
pub struct TreeWalkBuilder {
    root: PathBuf,
    include_root: bool,
    max_depth: Option<usize>,
}

impl TreeWalkBuilder {
    /// Creates a builder that will traverse the provided root path.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            include_root: true,
            max_depth: None,
        }
    }

    /// Controls whether the root entry should be included in the output.
    #[must_use]
    pub const fn include_root(mut self, include: bool) -> Self {
        self.include_root = include;
        self
    }

    /// Stops descending below `depth`. A depth of `1` yields only the root's
    /// immediate children.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Builds a [`TreeWalker`] using the configured options.
    pub fn build(self) -> Result<TreeWalker, WalkError> {
        let metadata = fs::symlink_metadata(&self.root)
            .map_err(|error| WalkError::root_metadata(self.root.clone(), error))?;
        let descend = EntryKind::of(&metadata) == EntryKind::Directory;

        let mut walker = TreeWalker {
            root: self.root,
            max_depth: self.max_depth,
            yielded_root: !self.include_root,
            root_metadata: Some(metadata),
            stack: Vec::new(),
            finished: false,
        };

        if descend && walker.max_depth != Some(0) {
            let state = DirectoryState::new(walker.root.clone(), PathBuf::new(), 0)?;
            walker.stack.push(state);
        }

        Ok(walker)
    }
}

/// Depth-first iterator over a directory tree.
///
/// Children are visited in byte-wise sorted order, and a directory's contents
/// are exhausted before its next sibling is visited. Symbolic links are
/// yielded as entries but never traversed, so a link to a directory cannot
/// pull foreign content into an archive copy.
pub struct TreeWalker {
    root: PathBuf,
    max_depth: Option<usize>,
    yielded_root: bool,
    root_metadata: Option<fs::Metadata>,
    stack: Vec<DirectoryState>,
    finished: bool,
}

impl TreeWalker {
    fn prepare_entry(
        &mut self,
        full_path: PathBuf,
        relative_path: PathBuf,
        depth: usize,
    ) -> Result<TreeEntry, WalkError> {
        let metadata = fs::symlink_metadata(&full_path)
            .map_err(|error| WalkError::metadata(full_path.clone(), error))?;

        let within_limit = self.max_depth.is_none_or(|limit| depth < limit);
        if EntryKind::of(&metadata) == EntryKind::Directory && within_limit {
            let state = DirectoryState::new(full_path.clone(), relative_path.clone(), depth)?;
            self.stack.push(state);
        }

        Ok(TreeEntry {
            full_path,
            relative_path,
            metadata,
            depth,
            is_root: false,
        })
    }
}

impl Iterator for TreeWalker {
    type Item = Result<TreeEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.yielded_root {
            self.yielded_root = true;
            if let Some(metadata) = self.root_metadata.take() {
                return Some(Ok(TreeEntry {
                    full_path: self.root.clone(),
                    relative_path: PathBuf::new(),
                    metadata,
                    depth: 0,
                    is_root: true,
                }));
            }
        }

        loop {
            let state = self.stack.last_mut()?;
            let Some(name) = state.next_name() else {
                self.stack.pop();
                continue;
            };
            let full_path = state.fs_path.join(&name);
            let relative_path = state.relative_prefix.join(&name);
            let depth = state.depth + 1;

            match self.prepare_entry(full_path, relative_path, depth) {
                Ok(entry) => return Some(Ok(entry)),
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
struct DirectoryState {
    fs_path: PathBuf,
    relative_prefix: PathBuf,
    entries: std::vec::IntoIter<OsString>,
    depth: usize,
}

impl DirectoryState {
    fn new(fs_path: PathBuf, relative_prefix: PathBuf, depth: usize) -> Result<Self, WalkError> {
        let read_dir =
            fs::read_dir(&fs_path).map_err(|error| WalkError::read_dir(fs_path.clone(), error))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|error| WalkError::read_dir_entry(fs_path.clone(), error))?;
            entries.push(entry.file_name());
        }
        entries.sort();

        Ok(Self {
            fs_path,
            relative_prefix,
            entries: entries.into_iter(),
            depth,
        })
    }

    fn next_name(&mut self) -> Option<OsString> {
        self.entries.next()
    }
}
