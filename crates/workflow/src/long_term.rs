use std::path::PathBuf;

use case::{CaseConfig, CaseStatus, CaseValues, LT_ARCHIVE_COMPLETED, LT_ARCHIVE_STARTING};
use transport::{
    LocalCopyTransport, SecureCopyTransport, TapeTransport, TransferRequest, TransferSummary,
    Transport, TransportMode,
};

use crate::error::ArchiveError;

/// The `lt-archive` command for one case.
///
/// A run walks `NOT_STARTED -> IN_PROGRESS -> COMPLETED`. The precondition
/// (short-term archiving completed, or `force`) and the mode are checked
/// before `lt_archive starting` is logged; any failure after that leaves the
/// log without `lt_archive completed`.
pub struct LongTermArchive {
    caseroot: PathBuf,
    config: CaseConfig,
    force: bool,
    dry_run: bool,
}

impl LongTermArchive {
    /// Loads `env_case.toml` from `caseroot`.
    pub fn load(caseroot: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let caseroot = caseroot.into();
        let config = CaseConfig::load(&caseroot)?;
        Ok(Self::from_parts(caseroot, config))
    }

    /// Uses an already loaded configuration.
    pub fn from_parts(caseroot: impl Into<PathBuf>, config: CaseConfig) -> Self {
        Self {
            caseroot: caseroot.into(),
            config,
            force: false,
            dry_run: false,
        }
    }

    /// Runs even when short-term archiving has not completed.
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Logs every transfer action without executing it.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Transport mode configured in `DOUT_L_MODE`.
    pub fn mode(&self) -> Result<TransportMode, ArchiveError> {
        let mode = self.config.require_text("DOUT_L_MODE")?;
        Ok(mode.parse::<TransportMode>()?)
    }

    /// Builds the strategy for `mode` from the case variables.
    pub fn transport_for(&self, mode: TransportMode) -> Result<Box<dyn Transport>, ArchiveError> {
        Ok(match mode {
            TransportMode::Tape => Box::new(TapeTransport::new(self.config.text("DOUT_L_HPSS_ACCNT"))),
            TransportMode::SecureCopy => Box::new(SecureCopyTransport::new(
                self.config.require_text("DOUT_L_SSH_MACHINE")?,
                self.config.text("DOUT_L_SSH_LOGINNAME"),
            )),
            TransportMode::LocalCopy => Box::new(LocalCopyTransport::new()),
        })
    }

    /// Assembles the transfer request for `mode`.
    pub fn request_for(&self, mode: TransportMode) -> Result<TransferRequest, ArchiveError> {
        let source = self.config.path("DOUT_S_ROOT").ok_or_else(|| {
            ArchiveError::configuration("DOUT_S_ROOT is required for long-term archiving")
        })?;
        if !source.is_dir() {
            return Err(ArchiveError::configuration(format!(
                "short-term archive root '{}' does not exist; check DOUT_S_ROOT",
                source.display()
            )));
        }

        let destination = match mode {
            TransportMode::LocalCopy => self
                .config
                .text("DOUT_L_ARC_ROOT")
                .map_or_else(|| self.config.require_text("DOUT_L_MSROOT"), Ok)?,
            TransportMode::Tape | TransportMode::SecureCopy => {
                self.config.require_text("DOUT_L_MSROOT")?
            }
        };
        let threads = self
            .config
            .integer("DOUT_L_MAX_THREADS")?
            .and_then(|threads| u32::try_from(threads).ok())
            .unwrap_or(1);

        Ok(TransferRequest::new(source, destination)
            .delete_source_after(self.config.flag("DOUT_L_DELETE_LOCAL_FILES")?)
            .dry_run(self.dry_run)
            .max_threads(threads))
    }

    /// Runs the configured transport.
    pub fn run(&self) -> Result<TransferSummary, ArchiveError> {
        let mode = self.start()?;
        let transport = self.transport_for(mode)?;
        self.finish(mode, transport.as_ref())
    }

    /// Runs with `transport` in place of the one `DOUT_L_MODE` selects.
    pub fn run_with(&self, transport: &dyn Transport) -> Result<TransferSummary, ArchiveError> {
        let mode = self.start()?;
        self.finish(mode, transport)
    }

    fn start(&self) -> Result<TransportMode, ArchiveError> {
        let status = CaseStatus::in_caseroot(&self.caseroot);
        if !self.force && !status.short_term_complete()? {
            return Err(ArchiveError::precondition(
                "short term archiving has not completed; run st-archive first or pass --force",
            ));
        }
        let mode = self.mode()?;
        if !self.dry_run {
            status.append(LT_ARCHIVE_STARTING)?;
        }
        Ok(mode)
    }

    fn finish(
        &self,
        mode: TransportMode,
        transport: &dyn Transport,
    ) -> Result<TransferSummary, ArchiveError> {
        let request = self.request_for(mode)?;
        tracing::info!(
            target: "archive::transfer",
            "long term archiving {} to {} via {}",
            request.source_root().display(),
            request.destination(),
            transport.name()
        );
        let summary = transport.relocate(&request)?;
        if !self.dry_run {
            CaseStatus::in_caseroot(&self.caseroot).append(LT_ARCHIVE_COMPLETED)?;
        }
        Ok(summary)
    }
}
