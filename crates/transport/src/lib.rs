#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `transport` moves a populated short-term archive tree to long-term
//! storage. Three strategies share the [`Transport`] trait:
//!
//! - [`TapeTransport`] drives the `hsi` tape client in one session.
//! - [`SecureCopyTransport`] checks passwordless `ssh` access, creates the
//!   remote directory, and copies each top-level entry with `scp`.
//! - [`LocalCopyTransport`] copies the tree to another local directory.
//!
//! [`TransportMode`] parses the configured mode string into one of these.
//!
//! # Design
//!
//! External tools are assembled as [`ProcessCommand`] values and executed by
//! a [`CommandRunner`], so command lines can be asserted in tests without a
//! tape system or a remote host. The thread count travels in each
//! [`TransferRequest`] and reaches only the spawned subprocess environment.
//!
//! # Invariants
//!
//! - Source entries are deleted only after their transfer succeeded. The
//!   secure-copy transport deletes per entry; the local copy deletes only when
//!   the whole tree copied.
//! - Dry runs execute nothing and report success.
//!
//! # Errors
//!
//! Missing tools and refused credentials surface as
//! [`TransportError::Unavailable`]; per-entry failures are collected and
//! returned together as [`TransportError::Partial`].
//!
//! # Examples
//!
//! ```
//! use transport::{LocalCopyTransport, Transport, TransferRequest};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let source = temp.path().join("archive");
//! std::fs::create_dir_all(source.join("atm/hist"))?;
//! std::fs::write(source.join("atm/hist/b40.cam.h0.0001-01.nc"), b"history")?;
//!
//! let destination = temp.path().join("long-term");
//! let request = TransferRequest::new(&source, destination.to_string_lossy());
//! let summary = LocalCopyTransport::new().relocate(&request)?;
//!
//! assert_eq!(summary.transferred, 1);
//! assert!(destination.join("atm/hist/b40.cam.h0.0001-01.nc").is_file());
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod command;
mod error;
mod local;
mod mode;
mod request;
mod ssh;
mod tape;

pub use command::{CommandOutput, CommandRunner, ProcessCommand, SystemRunner, shell_quote};
pub use error::TransportError;
pub use local::LocalCopyTransport;
pub use mode::TransportMode;
pub use request::{TransferRequest, TransferSummary};
pub use ssh::{SecureCopyTransport, SshCommand};
pub use tape::TapeTransport;

/// A long-term archive strategy.
pub trait Transport {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Transfers the request's source tree to its destination.
    fn relocate(&self, request: &TransferRequest) -> Result<TransferSummary, TransportError>;
}
