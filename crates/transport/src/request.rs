use std::path::{Path, PathBuf};

/// What a transport is asked to move: a populated short-term archive tree
/// and the destination it should end up under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    source_root: PathBuf,
    destination: String,
    delete_source: bool,
    dry_run: bool,
    max_threads: u32,
}

impl TransferRequest {
    /// Requests a copy of `source_root` to `destination`.
    ///
    /// The destination is a local path for the local-copy transport and a
    /// remote path for the tape and secure-copy transports.
    pub fn new(source_root: impl Into<PathBuf>, destination: impl Into<String>) -> Self {
        Self {
            source_root: source_root.into(),
            destination: destination.into(),
            delete_source: false,
            dry_run: false,
            max_threads: 1,
        }
    }

    /// Removes transferred entries from the source after they arrive.
    #[must_use]
    pub const fn delete_source_after(mut self, delete: bool) -> Self {
        self.delete_source = delete;
        self
    }

    /// Logs every action without performing it.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Thread count handed to the transfer tool; values below one become one.
    #[must_use]
    pub fn max_threads(mut self, threads: u32) -> Self {
        self.max_threads = threads.max(1);
        self
    }

    /// Local archive tree being transferred.
    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Destination path.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Whether the source is removed after transfer.
    #[must_use]
    pub const fn deletes_source(&self) -> bool {
        self.delete_source
    }

    /// Whether this is a dry run.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Thread count for the subprocess environment.
    #[must_use]
    pub const fn threads(&self) -> u32 {
        self.max_threads
    }
}

/// Successful outcome of a transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferSummary {
    /// Entries delivered to the destination. Tape transfers report zero
    /// because the client streams the tree in one command.
    pub transferred: usize,
    /// Source entries removed afterwards.
    pub removed: usize,
    /// True when nothing was executed.
    pub dry_run: bool,
}

impl TransferSummary {
    pub(crate) const fn dry_run() -> Self {
        Self {
            transferred: 0,
            removed: 0,
            dry_run: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_copy_without_deleting() {
        let request = TransferRequest::new("/scratch/archive/b40", "/home/user/csm/b40");
        assert_eq!(request.source_root(), Path::new("/scratch/archive/b40"));
        assert_eq!(request.destination(), "/home/user/csm/b40");
        assert!(!request.deletes_source());
        assert!(!request.is_dry_run());
        assert_eq!(request.threads(), 1);
    }

    #[test]
    fn thread_count_is_at_least_one() {
        let request = TransferRequest::new("a", "b").max_threads(0);
        assert_eq!(request.threads(), 1);
        assert_eq!(TransferRequest::new("a", "b").max_threads(6).threads(), 6);
    }
}
