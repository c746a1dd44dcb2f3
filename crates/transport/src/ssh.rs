use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use relocate::{EntryTransfer, RelocationPolicy, RelocationReport, Relocator};

use crate::Transport;
use crate::command::{CommandRunner, ProcessCommand, SystemRunner, run_checked, shell_quote};
use crate::error::TransportError;
use crate::request::{TransferRequest, TransferSummary};

/// Builder for `ssh` invocations against the archive host.
///
/// Batch mode is on by default so a missing key fails immediately instead
/// of prompting for a password.
#[derive(Clone, Debug)]
pub struct SshCommand {
    program: OsString,
    host: String,
    user: Option<String>,
    port: Option<u16>,
    batch_mode: bool,
    options: Vec<OsString>,
    remote_args: Vec<OsString>,
}

impl SshCommand {
    /// An `ssh` command targeting `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            program: OsString::from("ssh"),
            host: host.into(),
            user: None,
            port: None,
            batch_mode: true,
            options: Vec::new(),
            remote_args: Vec::new(),
        }
    }

    /// Overrides the `ssh` executable.
    pub fn set_program(&mut self, program: impl Into<OsString>) -> &mut Self {
        self.program = program.into();
        self
    }

    /// Logs in as `user`.
    pub fn set_user(&mut self, user: impl Into<String>) -> &mut Self {
        self.user = Some(user.into());
        self
    }

    /// Connects to `port`.
    pub fn set_port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    /// Enables or disables `-oBatchMode=yes`.
    pub fn set_batch_mode(&mut self, enabled: bool) -> &mut Self {
        self.batch_mode = enabled;
        self
    }

    /// Adds an option placed before the target.
    pub fn push_option(&mut self, option: impl Into<OsString>) -> &mut Self {
        self.options.push(option.into());
        self
    }

    /// Adds an argument to the remote command.
    pub fn push_remote_arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.remote_args.push(arg.into());
        self
    }

    /// `[user@]host`, with IPv6 literals bracketed.
    #[must_use]
    pub fn target(&self) -> String {
        remote_target(&self.host, self.user.as_deref())
    }

    /// Program and argument vector, for assertions on command assembly.
    #[must_use]
    pub fn command_parts_for_testing(&self) -> (OsString, Vec<OsString>) {
        self.to_process().command_parts_for_testing()
    }

    /// Converts into a runnable [`ProcessCommand`].
    #[must_use]
    pub fn to_process(&self) -> ProcessCommand {
        let mut command = ProcessCommand::new(self.program.clone());
        if self.batch_mode {
            command = command.arg("-oBatchMode=yes");
        }
        if let Some(port) = self.port {
            command = command.arg("-p").arg(port.to_string());
        }
        command
            .args(self.options.iter().cloned())
            .arg(self.target())
            .args(self.remote_args.iter().cloned())
    }
}

fn remote_target(host: &str, user: Option<&str>) -> String {
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };
    match user {
        Some(user) if !user.is_empty() => format!("{user}@{host}"),
        _ => host,
    }
}

/// Copies the archive to a remote host over `ssh` and `scp`.
///
/// Both clients must resolve on `PATH` and passwordless access must work
/// before anything is transferred. Each top-level entry of the source tree
/// is then copied on its own (directories recursively) and, when the request
/// deletes the source, removed as soon as its own copy succeeds.
pub struct SecureCopyTransport {
    host: String,
    user: Option<String>,
    ssh_program: OsString,
    scp_program: OsString,
    runner: Box<dyn CommandRunner>,
}

impl SecureCopyTransport {
    /// Transfers to `host`, logging in as `user` when given.
    pub fn new(host: impl Into<String>, user: Option<String>) -> Self {
        Self {
            host: host.into(),
            user: user.filter(|user| !user.trim().is_empty()),
            ssh_program: OsString::from("ssh"),
            scp_program: OsString::from("scp"),
            runner: Box::new(SystemRunner),
        }
    }

    /// Runs commands through `runner`.
    #[must_use]
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Overrides the `ssh` and `scp` executables.
    #[must_use]
    pub fn with_programs(mut self, ssh: impl Into<OsString>, scp: impl Into<OsString>) -> Self {
        self.ssh_program = ssh.into();
        self.scp_program = scp.into();
        self
    }

    fn ssh(&self) -> SshCommand {
        let mut command = SshCommand::new(self.host.clone());
        command.set_program(self.ssh_program.clone());
        if let Some(user) = &self.user {
            command.set_user(user.clone());
        }
        command
    }

    /// Command that proves non-interactive login works.
    #[must_use]
    pub fn credential_check(&self) -> ProcessCommand {
        let mut command = self.ssh();
        command.push_remote_arg("true");
        command.to_process()
    }

    /// Command that creates `destination` on the remote host.
    #[must_use]
    pub fn make_remote_dir(&self, destination: &str) -> ProcessCommand {
        let mut command = self.ssh();
        command.push_remote_arg(format!("mkdir -p {}", shell_quote(destination)));
        command.to_process()
    }

    /// Resolves `ssh` and `scp` before anything runs.
    fn locate_programs(&self) -> Result<(PathBuf, PathBuf), TransportError> {
        Ok((locate(&self.ssh_program)?, locate(&self.scp_program)?))
    }

    fn verify_credentials(&self) -> Result<(), TransportError> {
        let target = self.ssh().target();
        let unavailable = |detail: String| TransportError::Unavailable {
            tool: "ssh".to_owned(),
            reason: format!(
                "passwordless login to {target} failed ({detail}); create a key with \
                 `ssh-keygen -t rsa` and append the public key to ~/.ssh/authorized_keys on {}",
                self.host
            ),
        };
        let output = self
            .runner
            .run(&self.credential_check())
            .map_err(|error| unavailable(error.to_string()))?;
        if output.success {
            Ok(())
        } else {
            Err(unavailable(output.status))
        }
    }
}

impl Transport for SecureCopyTransport {
    fn name(&self) -> &'static str {
        "secure copy"
    }

    fn relocate(&self, request: &TransferRequest) -> Result<TransferSummary, TransportError> {
        let (ssh, scp) = self.locate_programs()?;
        tracing::debug!(
            target: "archive::transfer",
            ssh = %ssh.display(),
            scp = %scp.display(),
            "located secure copy clients"
        );
        let source = request.source_root();
        let destination = ScpDestination {
            runner: self.runner.as_ref(),
            program: &self.scp_program,
            target: self.ssh().target(),
            directory: request.destination(),
            threads: request.threads(),
        };
        let policy = if request.deletes_source() {
            RelocationPolicy::Move
        } else {
            RelocationPolicy::Copy
        };

        if request.is_dry_run() {
            tracing::info!(target: "archive::transfer", "dry run: {}", self.credential_check().display());
            tracing::info!(
                target: "archive::transfer",
                "dry run: {}",
                self.make_remote_dir(request.destination()).display()
            );
            if source.is_dir() {
                for entry in entries(source)? {
                    tracing::info!(
                        target: "archive::transfer",
                        "dry run: {} {} to {}",
                        policy.verb(),
                        entry.display(),
                        destination.destination()
                    );
                }
            }
            return Ok(TransferSummary::dry_run());
        }

        if !source.is_dir() {
            return Err(TransportError::MissingSource {
                path: source.to_path_buf(),
            });
        }

        self.verify_credentials()?;
        run_checked(self.runner.as_ref(), &self.make_remote_dir(request.destination()))?;

        let mut report = RelocationReport::new();
        Relocator::new(&destination).apply_all(entries(source)?, policy, &mut report);

        if !report.is_success() {
            return Err(TransportError::Partial {
                destination: destination.destination(),
                report,
            });
        }
        Ok(TransferSummary {
            transferred: report.completed(),
            removed: report.moved(),
            dry_run: false,
        })
    }
}

fn locate(program: &OsStr) -> Result<PathBuf, TransportError> {
    which::which(program).map_err(|error| {
        let tool = program.to_string_lossy().into_owned();
        TransportError::Unavailable {
            reason: format!("could not find {tool} on PATH ({error})"),
            tool,
        }
    })
}

fn entries(source: &Path) -> Result<Vec<std::path::PathBuf>, TransportError> {
    walk::top_level_entries(source)
        .map(|entries| entries
                .into_iter()
                .map(|entry| entry.full_path().to_path_buf())
                .collect())
        .map_err(|error| TransportError::io("list", source, error.into_io_error()))
}

/// Remote directory reached through `scp`.
struct ScpDestination<'a> {
    runner: &'a dyn CommandRunner,
    program: &'a OsString,
    target: String,
    directory: &'a str,
    threads: u32,
}

impl ScpDestination<'_> {
    fn command_for(&self, source: &Path) -> ProcessCommand {
        let mut command = ProcessCommand::new(self.program.clone()).arg("-p");
        if source.is_dir() {
            command = command.arg("-r");
        }
        command
            .arg("-oBatchMode=yes")
            .arg(source.as_os_str().to_owned())
            .arg(format!("{}:{}/", self.target, shell_quote(self.directory)))
            .env("maxthrds", self.threads.to_string())
    }
}

impl EntryTransfer for ScpDestination<'_> {
    fn destination(&self) -> String {
        format!("{}:{}", self.target, self.directory)
    }

    fn copy_entry(&self, source: &Path) -> io::Result<()> {
        let command = self.command_for(source);
        tracing::debug!(target: "archive::transfer", "running command: {}", command.display());
        let output = self.runner.run(&command)?;
        if output.success {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "`{}` failed with {}: {}",
                command.display(),
                output.status,
                output.stderr.trim()
            )))
        }
    }
}
