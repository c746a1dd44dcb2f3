//! Restart pointer files.
//!
//! A pointer file (`rpointer.<rootdir>[_NNNN]`) names the files a model
//! instance needs to resume from a checkpoint, one entry per line.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File-name prefix shared by every pointer file.
pub const POINTER_PREFIX: &str = "rpointer.";

/// Pointer file name for one instance of a component class.
#[must_use]
pub fn pointer_file_name(rootdir: &str, instance: &str) -> String {
    format!("{POINTER_PREFIX}{rootdir}{instance}")
}

/// Expands a pointer template for one checkpoint.
///
/// The words `datename` and `casename` are replaced, the result is split on
/// commas, and each non-empty entry becomes one line.
#[must_use]
pub fn render_pointer(template: &str, datename: &str, case: &str) -> String {
    let expanded = template
        .replace("datename", datename)
        .replace("casename", case);
    let mut content = String::new();
    for entry in expanded.split(',').map(str::trim) {
        if !entry.is_empty() {
            content.push_str(entry);
            content.push('\n');
        }
    }
    content
}

/// Replaces `dir/name` with `content`.
///
/// The content is staged in a sibling file and renamed into place, so readers
/// see either the previous pointer or the complete new one.
pub fn write_pointer(dir: &Path, name: &str, content: &str) -> io::Result<PathBuf> {
    let target = dir.join(name);
    let staging = dir.join(format!(".{name}.tmp"));
    if let Err(error) = stage(&staging, content).and_then(|()| fs::rename(&staging, &target)) {
        let _ = fs::remove_file(&staging);
        return Err(error);
    }
    tracing::debug!(target: "archive::pointer", path = %target.display(), "wrote pointer file");
    Ok(target)
}

fn stage(path: &Path, content: &str) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

/// Pointer files currently present in `rundir`, sorted by name.
pub fn run_pointer_files(rundir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut pointers = Vec::new();
    for entry in fs::read_dir(rundir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(POINTER_PREFIX))
        {
            pointers.push(entry.path());
        }
    }
    pointers.sort();
    Ok(pointers)
}
