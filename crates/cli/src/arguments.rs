//! Parsed command lines.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::ArgMatches;
use workflow::ShortTermMode;

use crate::command::{lt_archive_command, st_archive_command};

/// Options shared by both commands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CommonArgs {
    pub(crate) show_help: bool,
    pub(crate) show_version: bool,
    pub(crate) caseroot: Option<PathBuf>,
    pub(crate) verbose: u8,
}

impl CommonArgs {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            show_help: matches.get_flag("help"),
            show_version: matches.get_flag("version"),
            caseroot: matches.get_one::<PathBuf>("caseroot").cloned(),
            verbose: matches.get_count("verbose"),
        }
    }
}

/// `st-archive` command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ShortTermArgs {
    pub(crate) common: CommonArgs,
    pub(crate) mode: ShortTermMode,
}

/// `lt-archive` command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct LongTermArgs {
    pub(crate) common: CommonArgs,
    pub(crate) force: bool,
    pub(crate) dry_run: bool,
}

pub(crate) fn parse_st_archive_args<I, S>(arguments: I) -> Result<ShortTermArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let matches = st_archive_command().try_get_matches_from(arguments)?;
    let mode = if matches.get_flag("input") {
        ShortTermMode::InputListing
    } else if matches.get_flag("output") {
        ShortTermMode::OutputListing
    } else if matches.get_flag("undo") {
        ShortTermMode::Undo
    } else {
        ShortTermMode::Archive
    };
    Ok(ShortTermArgs {
        common: CommonArgs::from_matches(&matches),
        mode,
    })
}

pub(crate) fn parse_lt_archive_args<I, S>(arguments: I) -> Result<LongTermArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let matches = lt_archive_command().try_get_matches_from(arguments)?;
    Ok(LongTermArgs {
        common: CommonArgs::from_matches(&matches),
        force: matches.get_flag("force"),
        dry_run: matches.get_flag("dry-run"),
    })
}
