use std::io::{self, Write};
use std::path::Path;

use case::ArchiveSpec;

use crate::context::ArchiveContext;
use crate::error::{ShortTermError, ShortTermResult};

const SEPARATOR: &str =
    "============================================================================";

/// Writes the archive rules each component would apply.
///
/// For every component: its name, root directory, whether multiple
/// instances are configured, and each rule with its absolute destination.
pub fn write_input_listing(
    out: &mut dyn Write,
    spec: &ArchiveSpec,
    context: &ArchiveContext,
) -> io::Result<()> {
    for component in spec.components() {
        let rootdir = component.rootdir();
        writeln!(out, "{SEPARATOR}")?;
        writeln!(out, "component name = {}", component.name())?;
        writeln!(out, "rootdir = {rootdir}")?;
        writeln!(
            out,
            "multiple-instance support = {}",
            context.instances(rootdir) > 1
        )?;
        for rule in component.rules() {
            writeln!(out)?;
            writeln!(out, "  ***** File extension specification")?;
            writeln!(out, "  regex_suffix = {}", rule.regex_suffix())?;
            writeln!(
                out,
                "  subdir = {}",
                context.category_dir(rootdir, rule.subdir()).display()
            )?;
            writeln!(out, "  keep_last_in_rundir = {}", rule.keep_last_in_rundir())?;
        }
    }
    Ok(())
}

/// Writes every file below `archive_root`, one path per line.
///
/// A missing archive root lists nothing. Returns the number of paths written.
pub fn write_output_listing(out: &mut dyn Write, archive_root: &Path) -> ShortTermResult<usize> {
    if !archive_root.is_dir() {
        tracing::info!(
            target: "archive::listing",
            root = %archive_root.display(),
            "short-term archive does not exist"
        );
        return Ok(0);
    }

    tracing::info!(
        target: "archive::listing",
        "short-term archive listing of {}",
        archive_root.display()
    );
    let files = walk::list_files(archive_root)?;
    for file in &files {
        writeln!(out, "{}", file.display())
            .map_err(|error| ShortTermError::io("write listing of", archive_root, error))?;
    }
    Ok(files.len())
}
