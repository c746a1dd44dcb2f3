#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `relocate` is the move/copy/delete primitive shared by the short-term
//! archiver and the long-term transports. It turns a list of source paths
//! and a [`RelocationPolicy`] into filesystem operations and gathers every
//! per-file failure into a [`RelocationReport`] rather than stopping at the
//! first one.
//!
//! # Design
//!
//! - [`EntryTransfer`] abstracts the destination. [`LocalDirectory`] places
//!   entries in a directory on this host; the ssh transport implements the
//!   same trait on top of `scp`.
//! - [`Relocator`] owns the policy logic and the dry-run switch.
//! - Moves within a filesystem are renames. Across filesystems the file is
//!   copied, its length verified, and only then is the source removed.
//!
//! # Invariants
//!
//! - A source is removed only after its destination copy completed.
//! - Failures are reported in the order the operations ran.
//!
//! # Examples
//!
//! ```
//! use relocate::{LocalDirectory, RelocationPolicy, RelocationReport, Relocator};
//! use std::fs;
//!
//! # fn demo() -> std::io::Result<()> {
//! let temp = tempfile::tempdir()?;
//! let source = temp.path().join("case.cam.h0.0001-01.nc");
//! fs::write(&source, b"history")?;
//!
//! let destination = LocalDirectory::new(temp.path().join("archive/atm/hist"));
//! let mut report = RelocationReport::new();
//! Relocator::new(&destination).apply(&source, RelocationPolicy::Move, &mut report);
//!
//! assert!(report.is_success());
//! assert!(!source.exists());
//! assert!(temp.path().join("archive/atm/hist/case.cam.h0.0001-01.nc").exists());
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod local;
mod policy;
mod relocator;
mod report;
mod transfer;

pub use local::{LocalDirectory, copy_verified};
pub use policy::{Operation, RelocationPolicy};
pub use relocator::Relocator;
pub use report::{RelocationFailure, RelocationReport};
pub use transfer::{EntryTransfer, remove_entry};
