//! Process exit codes for the archive commands.
//!
//! Every [`ArchiveError`](crate::ArchiveError) maps to exactly one
//! [`ExitCode`], so batch scripts can tell a misconfigured case from an
//! interrupted transfer without parsing messages.
//!
//! # Examples
//!
//! ```
//! use workflow::ExitCode;
//!
//! let code = ExitCode::PartialRelocation;
//! assert_eq!(code.as_i32(), 23);
//! assert_eq!(code.description(), "some files could not be relocated");
//! ```

use std::fmt;

/// Exit codes returned by `st-archive` and `lt-archive`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful completion.
    Ok = 0,

    /// Syntax or usage error on the command line.
    Syntax = 1,

    /// The case configuration or archive specification is missing or invalid.
    Configuration = 2,

    /// The phase is not allowed to run yet.
    ///
    /// Returned when the model run has not succeeded, or when long-term
    /// archiving is requested before short-term archiving completed.
    PreconditionNotMet = 3,

    /// The configured long-term mode names no known transport.
    UnrecognizedMode = 4,

    /// The run directory holds no coupler restart files.
    NoRestartFiles = 5,

    /// A local filesystem operation outside the per-file loop failed.
    FileIo = 11,

    /// Some files were not moved, copied, or deleted.
    ///
    /// The files that did relocate stay where they went; rerunning the
    /// command picks up the rest.
    PartialRelocation = 23,

    /// The transfer tool ran and reported failure.
    TransferFailed = 124,

    /// A required external tool is missing or refused access.
    TransportUnavailable = 127,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns a human-readable description of this exit code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Syntax => "syntax or usage error",
            Self::Configuration => "invalid case configuration",
            Self::PreconditionNotMet => "precondition not met",
            Self::UnrecognizedMode => "unrecognized archive mode",
            Self::NoRestartFiles => "no restart files found",
            Self::FileIo => "error in file IO",
            Self::PartialRelocation => "some files could not be relocated",
            Self::TransferFailed => "transfer command failed",
            Self::TransportUnavailable => "transfer tool unavailable",
        }
    }

    /// Returns `true` if this represents a successful exit.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns `true` when rerunning the same command can finish the job
    /// without operator changes.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::PartialRelocation | Self::TransferFailed)
    }

    /// Creates an exit code from an i32 value.
    ///
    /// ```
    /// use workflow::ExitCode;
    ///
    /// assert_eq!(ExitCode::from_i32(3), Some(ExitCode::PreconditionNotMet));
    /// assert_eq!(ExitCode::from_i32(999), None);
    /// ```
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::Syntax),
            2 => Some(Self::Configuration),
            3 => Some(Self::PreconditionNotMet),
            4 => Some(Self::UnrecognizedMode),
            5 => Some(Self::NoRestartFiles),
            11 => Some(Self::FileIo),
            23 => Some(Self::PartialRelocation),
            124 => Some(Self::TransferFailed),
            127 => Some(Self::TransportUnavailable),
            _ => None,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        let value = u8::try_from(code.as_i32()).unwrap_or(u8::MAX);
        Self::from(value)
    }
}
