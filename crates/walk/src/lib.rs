#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` enumerates short-term archive trees deterministically. The same
//! ordering drives output listings, undo, and the long-term copy strategies,
//! so repeated invocations visit files in the same sequence regardless of the
//! underlying filesystem's directory order.
//!
//! # Design
//!
//! - [`TreeWalkBuilder`] configures whether the root is yielded and how deep
//!   traversal goes.
//! - [`TreeWalker`] implements [`Iterator`] and yields [`TreeEntry`] values in
//!   depth-first, lexically sorted order.
//! - Symbolic links are reported as [`EntryKind::Symlink`] and never
//!   followed; archive copies recreate them as links.
//!
//! # Errors
//!
//! Traversal stops at the first [`WalkError`], which names the offending path.
//!
//! # Examples
//!
//! ```
//! use walk::{TreeWalkBuilder, EntryKind};
//! use std::fs;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let root = temp.path().join("archive");
//! fs::create_dir_all(root.join("atm/hist"))?;
//! fs::write(root.join("atm/hist/case.cam.h0.0001-01.nc"), b"data")?;
//!
//! let files: Vec<_> = walk::list_files(&root)?
//!     .into_iter()
//!     .map(|path| path.strip_prefix(&root).unwrap().to_path_buf())
//!     .collect();
//! assert_eq!(files, vec![std::path::PathBuf::from("atm/hist/case.cam.h0.0001-01.nc")]);
//!
//! let top = TreeWalkBuilder::new(&root).include_root(false).max_depth(1).build()?;
//! let kinds: Vec<EntryKind> = top.map(|entry| entry.map(|e| e.kind())).collect::<Result<_, _>>()?;
//! assert_eq!(kinds, vec![EntryKind::Directory]);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod entry;
mod error;
mod walker;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

pub use entry::{EntryKind, TreeEntry};
pub use error::{WalkError, WalkErrorKind};
pub use walker::{TreeWalkBuilder, TreeWalker};

/// Lists every non-directory entry below `root` in walk order.
///
/// Regular files, symbolic links, and special files are included; directories
/// are not.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>, WalkError> {
    let mut files = Vec::new();
    for entry in TreeWalkBuilder::new(root).include_root(false).build()? {
        let entry = entry?;
        if entry.kind() != EntryKind::Directory {
            files.push(entry.full_path);
        }
    }
    Ok(files)
}

/// Returns the immediate children of `root` in sorted order.
pub fn top_level_entries(root: &Path) -> Result<Vec<TreeEntry>, WalkError> {
    TreeWalkBuilder::new(root)
        .include_root(false)
        .max_depth(1)
        .build()?
        .collect()
}
