use std::path::PathBuf;

use crate::command::{CommandRunner, ProcessCommand, SystemRunner, run_checked, shell_quote};
use crate::error::TransportError;
use crate::request::{TransferRequest, TransferSummary};
use crate::Transport;

const HSI: &str = "hsi";

/// Streams the archive tree into tape storage with the `hsi` client.
///
/// The whole tree goes in one client session: the destination directory is
/// created and marked sticky, then every entry below the source root is
/// stored recursively with `put -PRU`. When the request deletes the source,
/// the `d` flag asks the client itself to remove each local file once it is
/// safely on tape.
pub struct TapeTransport {
    account: Option<String>,
    program: Option<PathBuf>,
    runner: Box<dyn CommandRunner>,
}

impl TapeTransport {
    /// A tape transport charging `account`, found on `PATH` at run time.
    ///
    /// Accounts that are empty or start with `0000` are placeholders and are
    /// not passed to the client.
    pub fn new(account: Option<String>) -> Self {
        Self {
            account: account.filter(|account| is_billable(account)),
            program: None,
            runner: Box::new(SystemRunner),
        }
    }

    /// Uses `program` instead of searching `PATH` for `hsi`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Runs commands through `runner`.
    #[must_use]
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    fn locate(&self) -> Result<PathBuf, TransportError> {
        if let Some(program) = &self.program {
            return Ok(program.clone());
        }
        which::which(HSI).map_err(|error| TransportError::Unavailable {
            tool: HSI.to_owned(),
            reason: format!("could not find {HSI} on PATH ({error})"),
        })
    }

    /// Assembles the client invocation for `request` using `program`.
    #[must_use]
    pub fn command_for(&self, program: impl Into<PathBuf>, request: &TransferRequest) -> ProcessCommand {
        let destination = shell_quote(request.destination());
        let flags = if request.deletes_source() { "-PRUd" } else { "-PRU" };
        let script = format!(
            "mkdir -p {destination} ; chmod +t {destination} ; cd {destination} ; put {flags} *"
        );

        let mut command = ProcessCommand::new(program.into().into_os_string());
        if let Some(account) = &self.account {
            command = command.arg("-a").arg(account);
        }
        command
            .arg(script)
            .current_dir(request.source_root())
            .env("maxthrds", request.threads().to_string())
    }
}

impl Transport for TapeTransport {
    fn name(&self) -> &'static str {
        "tape"
    }

    fn relocate(&self, request: &TransferRequest) -> Result<TransferSummary, TransportError> {
        let program = self.locate()?;
        let command = self.command_for(program, request);

        if request.is_dry_run() {
            tracing::info!(target: "archive::transfer", "dry run: {}", command.display());
            return Ok(TransferSummary::dry_run());
        }

        if !request.source_root().is_dir() {
            return Err(TransportError::MissingSource {
                path: request.source_root().to_path_buf(),
            });
        }

        run_checked(self.runner.as_ref(), &command)?;
        tracing::info!(
            target: "archive::transfer",
            "stored {} on tape under {}",
            request.source_root().display(),
            request.destination()
        );
        Ok(TransferSummary::default())
    }
}

fn is_billable(account: &str) -> bool {
    let account = account.trim();
    !account.is_empty() && !account.starts_with("0000")
}
