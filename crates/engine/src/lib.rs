#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` implements short-term archiving: discovering the checkpoints a
//! run produced and relocating each checkpoint's output from the run
//! directory into the archive tree under `DOUT_S_ROOT`.
//!
//! # Design
//!
//! - [`discover_datenames`] reads coupler restart names and returns a
//!   [`RestartSet`] whose last entry is the most recent checkpoint.
//! - [`ShortTermArchiver`] walks the active components of an
//!   [`ArchiveSpec`](case::ArchiveSpec). History and log files move to
//!   `<root>/<rootdir>/<subdir>`; restart files land in
//!   `<root>/rest/<datename>`.
//! - Restart handling depends on the checkpoint. The most recent set is
//!   copied, so the run directory stays resumable, and the run directory's
//!   pointer files are copied alongside. Intermediate sets are moved with a
//!   freshly written pointer file per instance, or deleted when interim
//!   restarts are not retained.
//! - Auxiliary files named inside restart files are found through a
//!   [`RestartInspector`]; [`NcdumpInspector`] shells out to `ncdump`.
//! - [`write_input_listing`], [`write_output_listing`], and [`undo_archive`]
//!   back the alternative short-term modes.
//!
//! # Invariants
//!
//! - A pointer file is written only after every restart file of its instance
//!   was moved, so a partial set never advertises itself as resumable.
//! - Re-running a checkpoint overwrites destination files and replaces
//!   pointer files whole; nothing is appended.
//!
//! # Errors
//!
//! [`ShortTermError`] covers conditions that stop the invocation. Per-file
//! failures accumulate in a [`relocate::RelocationReport`].
//!
//! # Examples
//!
//! ```
//! use case::{ArchiveSpec, ComponentSpec, FileExtensionRule};
//! use engine::{ArchiveContext, NcdumpInspector, ShortTermArchiver, discover_datenames};
//! use std::fs;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let rundir = temp.path().join("run");
//! fs::create_dir(&rundir)?;
//! fs::write(rundir.join("case.cpl.r.0001-01-02-00000.nc"), b"r")?;
//! fs::write(rundir.join("case.cpl.hi.0001-01-01.nc"), b"h")?;
//!
//! let spec = ArchiveSpec::from_components(vec![
//!     ComponentSpec::new("cpl", "cpl")
//!         .with_rule(FileExtensionRule::new(r"\.hi\.", "hist", false))
//!         .with_rule(FileExtensionRule::new(r"\.r\.", "rest", false)),
//! ])?;
//! let context = ArchiveContext::new("case", &rundir, temp.path().join("archive"));
//! let inspector = NcdumpInspector::new();
//!
//! let restarts = discover_datenames(&rundir, "case")?;
//! let report = ShortTermArchiver::new(&spec, &context, &inspector).archive(&restarts)?;
//!
//! assert!(report.is_success());
//! assert!(temp.path().join("archive/cpl/hist/case.cpl.hi.0001-01-01.nc").exists());
//! assert!(temp.path().join("archive/rest/0001-01-02-00000/case.cpl.r.0001-01-02-00000.nc").exists());
//! assert!(rundir.join("case.cpl.r.0001-01-02-00000.nc").exists());
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod context;
mod datenames;
mod error;
mod listing;
mod pattern;
mod pointer;
mod process;
mod restart_vars;
mod undo;

pub use context::{ArchiveContext, COUPLER};
pub use datenames::{RestartSet, discover_datenames};
pub use error::{ShortTermError, ShortTermResult};
pub use listing::{write_input_listing, write_output_listing};
pub use pattern::FilePattern;
pub use pointer::{
    POINTER_PREFIX, pointer_file_name, render_pointer, run_pointer_files, write_pointer,
};
pub use process::ShortTermArchiver;
pub use restart_vars::{NcdumpInspector, RestartInspector, parse_ncdump_variable};
pub use undo::undo_archive;
