#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line front-end shared by the `st-archive` and
//! `lt-archive` binaries. It parses the arguments, installs logging, runs
//! the matching [`workflow`] command against a case directory, and turns the
//! result into a process exit status.
//!
//! # Design
//!
//! [`run_st_archive`] and [`run_lt_archive`] accept an iterator of arguments
//! together with handles for standard output and error, so tests drive them
//! exactly like the binaries do. Parsing uses a `clap` builder with the
//! built-in help and version flags disabled and replaced by explicit
//! `--help`/`-h` and `--version`/`-V` switches. Listings go to standard
//! output; diagnostics and log events go to standard error.
//!
//! # Invariants
//!
//! - Neither entry point panics; every failure becomes a non-zero status.
//! - `--input`, `--output` and `--undo` are mutually exclusive.
//! - The returned status is [`workflow::ExitCode::as_i32`] of the failure, or
//!   `0` on success.
//!
//! # Errors
//!
//! Argument errors print the `clap` diagnostic and return
//! [`workflow::ExitCode::Syntax`]. Command failures print one line prefixed
//! with the program name.
//!
//! # Examples
//!
//! ```
//! use cli::run_lt_archive;
//!
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let status = run_lt_archive(["lt-archive", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(status, 0);
//! assert!(String::from_utf8(stdout).unwrap().starts_with("lt-archive "));
//! assert!(stderr.is_empty());
//! ```

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use clap::Command;
use logging::VerbosityConfig;
use tracing::debug;
use workflow::{ArchiveError, ExitCode, LongTermArchive, ShortTermArchive, ShortTermOutcome};

mod arguments;
mod command;


use arguments::{CommonArgs, parse_lt_archive_args, parse_st_archive_args};
use command::{LT_ARCHIVE, ST_ARCHIVE, lt_archive_command, st_archive_command};

/// Entry point for `st-archive`.
///
/// Archives the case in `--caseroot` (default: the current directory), or
/// lists or undoes the short-term archive when `--input`, `--output` or
/// `--undo` is given. Returns the process exit status.
pub fn run_st_archive<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let parsed = match parse_st_archive_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => return report_parse_error(&error, stderr),
    };
    if let Some(status) = handle_informational(&parsed.common, st_archive_command, stdout) {
        return status;
    }
    let Some(caseroot) = prepare(ST_ARCHIVE, &parsed.common, stderr) else {
        return ExitCode::FileIo.as_i32();
    };

    let archive = match ShortTermArchive::load(&caseroot) {
        Ok(archive) => archive,
        Err(error) => return report_failure(ST_ARCHIVE, &error, stderr),
    };
    match archive.run(parsed.mode, stdout) {
        Ok(outcome) => {
            report_short_term(&outcome, stdout);
            ExitCode::Ok.as_i32()
        }
        Err(error) => report_failure(ST_ARCHIVE, &error, stderr),
    }
}

/// Entry point for `lt-archive`.
///
/// Relocates the short-term archive of the case in `--caseroot` with the
/// transport selected by `DOUT_L_MODE`. `--force` skips the short-term
/// completion check and `--dry-run` only logs what would happen.
pub fn run_lt_archive<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let parsed = match parse_lt_archive_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => return report_parse_error(&error, stderr),
    };
    if let Some(status) = handle_informational(&parsed.common, lt_archive_command, stdout) {
        return status;
    }
    let Some(caseroot) = prepare(LT_ARCHIVE, &parsed.common, stderr) else {
        return ExitCode::FileIo.as_i32();
    };

    let result = LongTermArchive::load(&caseroot).and_then(|archive| {
        archive
            .force(parsed.force)
            .dry_run(parsed.dry_run)
            .run()
    });
    match result {
        Ok(summary) if summary.dry_run => {
            let _ = writeln!(stdout, "{LT_ARCHIVE}: dry run, nothing was transferred");
            ExitCode::Ok.as_i32()
        }
        Ok(summary) => {
            let _ = writeln!(
                stdout,
                "{LT_ARCHIVE}: transferred {} entries, removed {} local entries",
                summary.transferred, summary.removed
            );
            ExitCode::Ok.as_i32()
        }
        Err(error) => report_failure(LT_ARCHIVE, &error, stderr),
    }
}

/// Answers `--help` and `--version`, which take precedence over any work.
fn handle_informational<Out: Write>(
    common: &CommonArgs,
    command: fn() -> Command,
    stdout: &mut Out,
) -> Option<i32> {
    let mut command = command();
    let text = if common.show_help {
        command.render_help().to_string()
    } else if common.show_version {
        format!("{} {}\n", command.get_name(), env!("CARGO_PKG_VERSION"))
    } else {
        return None;
    };
    let status = match stdout.write_all(text.as_bytes()) {
        Ok(()) => ExitCode::Ok,
        Err(_) => ExitCode::FileIo,
    };
    Some(status.as_i32())
}

/// Installs logging and resolves the case directory.
fn prepare<Err: Write>(program: &str, common: &CommonArgs, stderr: &mut Err) -> Option<PathBuf> {
    logging::init_tracing(VerbosityConfig::from_verbose_level(common.verbose));
    let caseroot = match &common.caseroot {
        Some(path) => path.clone(),
        None => match std::env::current_dir() {
            Ok(path) => path,
            Err(error) => {
                let _ = writeln!(
                    stderr,
                    "{program}: error: cannot determine the current directory: {error}"
                );
                return None;
            }
        },
    };
    debug!(target: "archive::cli", caseroot = %caseroot.display(), "resolved case directory");
    Some(caseroot)
}

fn report_short_term<Out: Write>(outcome: &ShortTermOutcome, stdout: &mut Out) {
    let _ = match outcome {
        ShortTermOutcome::Archived {
            checkpoints,
            report,
        } => writeln!(
            stdout,
            "{ST_ARCHIVE}: archived {checkpoints} checkpoint(s): {} moved, {} copied, {} deleted",
            report.moved(),
            report.copied(),
            report.deleted()
        ),
        ShortTermOutcome::Restored { report } => writeln!(
            stdout,
            "{ST_ARCHIVE}: restored {} file(s) to the run directory",
            report.moved()
        ),
        ShortTermOutcome::InputListed | ShortTermOutcome::OutputListed { .. } => Ok(()),
    };
}

fn report_parse_error<Err: Write>(error: &clap::Error, stderr: &mut Err) -> i32 {
    let _ = write!(stderr, "{}", error.render());
    ExitCode::Syntax.as_i32()
}

fn report_failure<Err: Write>(program: &str, error: &ArchiveError, stderr: &mut Err) -> i32 {
    let code = error.exit_code();
    let _ = writeln!(stderr, "{program}: error: {error}");
    debug!(target: "archive::cli", code = code.as_i32(), "{}", code.description());
    code.as_i32()
}
