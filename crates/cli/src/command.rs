//! `clap` command definitions for both binaries.

use clap::{Arg, ArgAction, ArgGroup, Command, builder::PathBufValueParser};

pub(crate) const ST_ARCHIVE: &str = "st-archive";
pub(crate) const LT_ARCHIVE: &str = "lt-archive";

fn common_args(command: Command) -> Command {
    command
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("caseroot")
                .long("caseroot")
                .value_name("DIR")
                .help("Case directory to archive (defaults to the current directory).")
                .value_parser(PathBufValueParser::new()),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Report more progress; repeat for debug and trace output.")
                .action(ArgAction::Count),
        )
}

pub(crate) fn st_archive_command() -> Command {
    common_args(
        Command::new(ST_ARCHIVE)
            .about("Move model output from the run directory into the short-term archive."),
    )
    .arg(
        Arg::new("input")
            .long("input")
            .help("List the archive specification as it applies to this case.")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("output")
            .long("output")
            .help("List every file already in the short-term archive.")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("undo")
            .long("undo")
            .help("Move archived files back into the run directory.")
            .action(ArgAction::SetTrue),
    )
    .group(
        ArgGroup::new("mode")
            .args(["input", "output", "undo"])
            .multiple(false),
    )
}

pub(crate) fn lt_archive_command() -> Command {
    common_args(
        Command::new(LT_ARCHIVE)
            .about("Relocate the short-term archive to long-term storage."),
    )
    .arg(
        Arg::new("force")
            .long("force")
            .short('f')
            .help("Run even if short-term archiving has not completed.")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("dry-run")
            .long("dry-run")
            .short('n')
            .help("Log every transfer step without performing it.")
            .action(ArgAction::SetTrue),
    )
}
