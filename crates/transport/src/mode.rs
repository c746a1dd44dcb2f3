use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// Long-term archive strategy selected by `DOUT_L_MODE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportMode {
    /// Stream the archive to tape storage with `hsi`.
    Tape,
    /// Copy the archive to a remote host with `ssh` and `scp`.
    SecureCopy,
    /// Copy the archive to another local directory.
    LocalCopy,
}

impl TransportMode {
    /// Mode strings in declaration order.
    pub const NAMES: [&'static str; 3] = ["copy_dirs_hsi", "copy_dirs_ssh", "copy_dirs_local"];

    /// Mode string as written in the case configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tape => Self::NAMES[0],
            Self::SecureCopy => Self::NAMES[1],
            Self::LocalCopy => Self::NAMES[2],
        }
    }
}

impl FromStr for TransportMode {
    type Err = TransportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "copy_dirs_hsi" => Ok(Self::Tape),
            "copy_dirs_ssh" => Ok(Self::SecureCopy),
            "copy_dirs_local" => Ok(Self::LocalCopy),
            _ => Err(TransportError::UnrecognizedMode {
                mode: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
