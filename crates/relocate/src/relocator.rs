use std::path::Path;

use crate::policy::RelocationPolicy;
use crate::report::{RelocationFailure, RelocationReport};
use crate::transfer::{EntryTransfer, remove_entry};

/// Applies a [`RelocationPolicy`] to source entries against one destination.
///
/// Every operation is attempted independently: a failure is recorded in the
/// caller's [`RelocationReport`] and the next entry is still processed.
pub struct Relocator<'a> {
    transfer: &'a dyn EntryTransfer,
    dry_run: bool,
}

impl<'a> Relocator<'a> {
    /// Relocates entries through `transfer`.
    pub fn new(transfer: &'a dyn EntryTransfer) -> Self {
        Self {
            transfer,
            dry_run: false,
        }
    }

    /// Logs each operation without touching the filesystem.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Applies `policy` to `source`, returning whether it succeeded.
    pub fn apply(
        &self,
        source: &Path,
        policy: RelocationPolicy,
        report: &mut RelocationReport,
    ) -> bool {
        tracing::debug!(
            target: "archive::relocate",
            action = policy.verb(),
            source = %source.display(),
            destination = %self.transfer.destination(),
            dry_run = self.dry_run,
        );

        if self.dry_run {
            report.record_success(policy);
            return true;
        }

        let outcome = match policy {
            RelocationPolicy::Move => self.transfer.move_entry(source),
            RelocationPolicy::Copy => self.transfer.copy_entry(source),
            RelocationPolicy::Delete => remove_entry(source),
        };

        match outcome {
            Ok(()) => {
                report.record_success(policy);
                true
            }
            Err(error) => {
                report.record_failure(RelocationFailure::new(policy, source, error));
                false
            }
        }
    }

    /// Applies `policy` to every source, returning the number that succeeded.
    pub fn apply_all<I, P>(
        &self,
        sources: I,
        policy: RelocationPolicy,
        report: &mut RelocationReport,
    ) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        sources
            .into_iter()
            .filter(|source| self.apply(source.as_ref(), policy, report))
            .count()
    }
}
