use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::TransportError;

/// A subprocess invocation assembled by a transport.
///
/// Transports build these rather than [`Command`] directly so the exact
/// argument vector can be inspected in tests and logged before it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessCommand {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
}

impl ProcessCommand {
    /// Starts a command for `program`.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the command from `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Sets an environment variable for the subprocess only.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Program to execute.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments after the program.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Working directory, if set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Value the subprocess sees for `key`, if this command sets it.
    #[must_use]
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.envs
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_os_str())
    }

    /// Program and argument vector, for assertions on command assembly.
    #[must_use]
    pub fn command_parts_for_testing(&self) -> (OsString, Vec<OsString>) {
        (self.program.clone(), self.args.clone())
    }

    /// Shell-style rendering for log lines and error messages.
    #[must_use]
    pub fn display(&self) -> String {
        let mut rendered = shell_quote(&self.program.to_string_lossy());
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(&shell_quote(&arg.to_string_lossy()));
        }
        rendered
    }

    /// Converts into a [`Command`] ready to spawn.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        command
    }
}

/// Captured result of a finished subprocess.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit status description.
    pub status: String,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run with no output.
    #[must_use]
    pub fn succeeded() -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_owned(),
            ..Self::default()
        }
    }

    /// A failed run with the given exit code and standard error.
    #[must_use]
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            status: format!("exit status: {code}"),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Executes [`ProcessCommand`]s, blocking until each exits.
pub trait CommandRunner {
    /// Runs `command` to completion and captures its output.
    fn run(&self, command: &ProcessCommand) -> io::Result<CommandOutput>;
}

/// Runs commands as real subprocesses.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ProcessCommand) -> io::Result<CommandOutput> {
        let output = command.to_command().output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs `command`, turning spawn failures and non-zero exits into errors.
pub(crate) fn run_checked(
    runner: &dyn CommandRunner,
    command: &ProcessCommand,
) -> Result<CommandOutput, TransportError> {
    tracing::info!(target: "archive::transfer", "running command: {}", command.display());
    let output = runner.run(command).map_err(|source| TransportError::Spawn {
        program: command.program().to_string_lossy().into_owned(),
        source,
    })?;
    if output.success {
        Ok(output)
    } else {
        Err(TransportError::CommandFailed {
            command: command.display(),
            status: output.status,
            stderr: output.stderr,
        })
    }
}

/// Quotes `value` for a POSIX shell when it contains anything beyond a
/// conservative set of safe characters.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value.chars().all(|ch| {
            ch.is_ascii_alphanumeric() || matches!(ch, '/' | '.' | '_' | '-' | ':' | '@' | '+' | ',' | '=')
        });
    if safe {
        value.to_owned()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
