use serde::Serialize;

/// Aggregate outcome of processing one aux file.
///
/// Ordered `Unchanged < Changed < Broken` so that stages can only ever make
/// the running verdict worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Output already up to date
    Unchanged,
    /// Output file was (or will be) rewritten
    Changed,
    /// Policy violations found, nothing written
    Broken,
}

impl Verdict {
    /// Downgrade to `other` if it is worse
    pub fn worsen(self, other: Verdict) -> Verdict {
        self.max(other)
    }

    /// Downgrade to `Broken` unless `valid` holds
    pub fn require(self, valid: bool) -> Verdict {
        if valid { self } else { self.worsen(Verdict::Broken) }
    }

    /// Process exit code for this verdict
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Unchanged => 0,
            Verdict::Changed => 1,
            Verdict::Broken => 2,
        }
    }
}
