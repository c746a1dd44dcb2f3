use std::fs;

use relocate::{LocalDirectory, RelocationPolicy, RelocationReport, Relocator};
use walk::{EntryKind, TreeWalkBuilder};

use crate::context::ArchiveContext;
use crate::error::{ShortTermError, ShortTermResult};

/// Moves archived files back into the run directory.
///
/// Every regular file below the archive root returns to the run directory
/// unless a file of the same name is already there; those (keep-last
/// copies, most-recent restarts, pointer files) stay in the archive. Archive
/// directories left empty afterwards are removed.
pub fn undo_archive(context: &ArchiveContext) -> ShortTermResult<RelocationReport> {
    let rundir = context.rundir();
    let archive_root = context.archive_root();
    if !rundir.is_dir() {
        return Err(ShortTermError::MissingRunDir {
            path: rundir.to_path_buf(),
        });
    }

    let mut report = RelocationReport::new();
    if !archive_root.is_dir() {
        return Ok(report);
    }

    let destination = LocalDirectory::new(rundir);
    let relocator = Relocator::new(&destination);
    let mut directories = Vec::new();

    let entries = TreeWalkBuilder::new(archive_root)
        .include_root(false)
        .build()?
        .collect::<Result<Vec<_>, _>>()?;
    for entry in entries {
        match entry.kind() {
            EntryKind::Directory => directories.push(entry.full_path().to_path_buf()),
            EntryKind::File => {
                let Some(name) = entry.file_name() else {
                    continue;
                };
                if rundir.join(name).exists() {
                    tracing::debug!(
                        target: "archive::undo",
                        path = %entry.full_path().display(),
                        "already present in run directory; left in archive"
                    );
                    continue;
                }
                relocator.apply(entry.full_path(), RelocationPolicy::Move, &mut report);
            }
            EntryKind::Symlink | EntryKind::Other => {}
        }
    }

    for directory in directories.iter().rev() {
        if fs::remove_dir(directory).is_ok() {
            tracing::debug!(
                target: "archive::undo",
                path = %directory.display(),
                "removed empty archive directory"
            );
        }
    }

    tracing::info!(
        target: "archive::undo",
        restored = report.moved(),
        failed = report.failures().len(),
        "undo complete"
    );
    Ok(report)
}
