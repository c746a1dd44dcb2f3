use std::fmt;

/// What happens to a source entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelocationPolicy {
    /// Place the entry at the destination and remove the source.
    Move,
    /// Place the entry at the destination and keep the source.
    Copy,
    /// Remove the source without placing it anywhere.
    Delete,
}

impl RelocationPolicy {
    /// Verb used in diagnostics.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Copy => "copy",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for RelocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Operation named in a [`RelocationFailure`](crate::RelocationFailure).
///
/// Covers the three relocation policies plus the bookkeeping steps that run
/// alongside them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A move under [`RelocationPolicy::Move`].
    Move,
    /// A copy under [`RelocationPolicy::Copy`].
    Copy,
    /// A removal under [`RelocationPolicy::Delete`].
    Delete,
    /// Writing a generated file such as a restart pointer.
    Write,
    /// Reading a file to discover what else must travel with it.
    Inspect,
}

impl Operation {
    /// Verb used in diagnostics.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Copy => "copy",
            Self::Delete => "delete",
            Self::Write => "write",
            Self::Inspect => "inspect",
        }
    }
}

impl From<RelocationPolicy> for Operation {
    fn from(policy: RelocationPolicy) -> Self {
        match policy {
            RelocationPolicy::Move => Self::Move,
            RelocationPolicy::Copy => Self::Copy,
            RelocationPolicy::Delete => Self::Delete,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}
