use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use filetime::FileTime;
use relocate::{RelocationFailure, RelocationPolicy, RelocationReport, copy_verified, remove_entry};
use walk::{EntryKind, TreeEntry, TreeWalkBuilder};

use crate::Transport;
use crate::error::TransportError;
use crate::request::{TransferRequest, TransferSummary};

/// Copies the archive tree to another local directory.
///
/// Regular files are copied with their permissions and timestamps, symbolic
/// links are recreated as links, and directories receive their source
/// metadata once everything below them is in place. The source is removed
/// only after the entire tree copied without a single failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalCopyTransport;

impl LocalCopyTransport {
    /// A local copy transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for LocalCopyTransport {
    fn name(&self) -> &'static str {
        "local copy"
    }

    fn relocate(&self, request: &TransferRequest) -> Result<TransferSummary, TransportError> {
        let source = request.source_root();
        let destination = PathBuf::from(request.destination());

        if !source.is_dir() {
            return Err(TransportError::MissingSource {
                path: source.to_path_buf(),
            });
        }
        if resolve(&destination)?.starts_with(resolve(source)?) {
            return Err(TransportError::io(
                "copy into",
                destination,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "destination lies inside the source tree",
                ),
            ));
        }

        let entries = collect_entries(source)?;

        if request.is_dry_run() {
            for entry in &entries {
                tracing::info!(
                    target: "archive::transfer",
                    "dry run: copy {} to {}",
                    entry.full_path().display(),
                    destination.join(entry.relative_path()).display()
                );
            }
            if request.deletes_source() {
                tracing::info!(
                    target: "archive::transfer",
                    "dry run: remove contents of {}",
                    source.display()
                );
            }
            return Ok(TransferSummary::dry_run());
        }

        fs::create_dir_all(&destination)
            .map_err(|error| TransportError::io("create directory", &destination, error))?;

        let mut report = RelocationReport::new();
        let mut directories = Vec::new();
        for entry in &entries {
            let target = destination.join(entry.relative_path());
            if entry.kind() == EntryKind::Directory {
                match fs::create_dir_all(&target) {
                    Ok(()) => directories.push((entry, target)),
                    Err(error) => report.record_failure(RelocationFailure::new(
                        RelocationPolicy::Copy,
                        entry.full_path(),
                        error,
                    )),
                }
                continue;
            }
            match copy_entry(entry, &target) {
                Ok(true) => report.record_success(RelocationPolicy::Copy),
                Ok(false) => {}
                Err(error) => report.record_failure(RelocationFailure::new(
                    RelocationPolicy::Copy,
                    entry.full_path(),
                    error,
                )),
            }
        }

        // Children first, so read-only directories are locked only after
        // everything below them has been written.
        for (entry, target) in directories.iter().rev() {
            if let Err(error) = apply_metadata(entry, target) {
                report.record_failure(RelocationFailure::new(
                    RelocationPolicy::Copy,
                    entry.full_path(),
                    error,
                ));
            }
        }

        if !report.is_success() {
            tracing::warn!(
                target: "archive::transfer",
                "leaving {} in place because the copy was incomplete",
                source.display()
            );
            return Err(TransportError::Partial {
                destination: destination.display().to_string(),
                report,
            });
        }

        let transferred = report.copied();
        let removed = if request.deletes_source() {
            remove_contents(source, &mut report)?
        } else {
            0
        };
        if !report.is_success() {
            return Err(TransportError::Partial {
                destination: destination.display().to_string(),
                report,
            });
        }

        tracing::info!(
            target: "archive::transfer",
            "copied {transferred} file(s) from {} to {}",
            source.display(),
            destination.display()
        );
        Ok(TransferSummary {
            transferred,
            removed,
            dry_run: false,
        })
    }
}

/// Absolute form of `path` with symbolic links resolved. Components that do
/// not exist yet are appended lexically.
fn resolve(path: &Path) -> Result<PathBuf, TransportError> {
    let failed = |error| TransportError::io("resolve", path, error);
    let absolute = std::path::absolute(path).map_err(failed)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while fs::metadata(existing).is_err() {
        let (Some(parent), Some(last)) = (existing.parent(), existing.components().next_back())
        else {
            break;
        };
        missing.push(last);
        existing = parent;
    }

    let mut resolved = existing.canonicalize().map_err(failed)?;
    for component in missing.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

fn collect_entries(source: &Path) -> Result<Vec<TreeEntry>, TransportError> {
    let walk_error = |error: walk::WalkError| {
        let path = error.path().to_path_buf();
        TransportError::io("walk", path, error.into_io_error())
    };
    TreeWalkBuilder::new(source)
        .build()
        .map_err(walk_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(walk_error)
}

/// Copies one non-directory entry, returning whether anything was copied.
fn copy_entry(entry: &TreeEntry, target: &Path) -> io::Result<bool> {
    match entry.kind() {
        EntryKind::File => {
            copy_verified(entry.full_path(), target)?;
            fs::set_permissions(target, entry.metadata().permissions())?;
            Ok(true)
        }
        EntryKind::Symlink => {
            copy_symlink(entry.full_path(), target)?;
            Ok(true)
        }
        EntryKind::Other | EntryKind::Directory => {
            tracing::warn!(
                target: "archive::transfer",
                "skipping special file {}",
                entry.full_path().display()
            );
            Ok(false)
        }
    }
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> io::Result<()> {
    let link = fs::read_link(source)?;
    if fs::symlink_metadata(target).is_ok() {
        remove_entry(target)?;
    }
    std::os::unix::fs::symlink(link, target)
}

#[cfg(not(unix))]
fn copy_symlink(_source: &Path, _target: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links can only be recreated on unix",
    ))
}

fn apply_metadata(entry: &TreeEntry, target: &Path) -> io::Result<()> {
    let metadata = entry.metadata();
    fs::set_permissions(target, metadata.permissions())?;
    filetime::set_file_times(
        target,
        FileTime::from_last_access_time(metadata),
        FileTime::from_last_modification_time(metadata),
    )
}

/// Removes everything below `source`, keeping the directory itself.
fn remove_contents(source: &Path, report: &mut RelocationReport) -> Result<usize, TransportError> {
    let entries = walk::top_level_entries(source)
        .map_err(|error| TransportError::io("list", source, error.into_io_error()))?;
    let mut removed = 0;
    for entry in entries {
        match remove_entry(entry.full_path()) {
            Ok(()) => {
                report.record_success(RelocationPolicy::Delete);
                removed += 1;
            }
            Err(error) => report.record_failure(RelocationFailure::new(
                RelocationPolicy::Delete,
                entry.full_path(),
                error,
            )),
        }
    }
    Ok(removed)
}
