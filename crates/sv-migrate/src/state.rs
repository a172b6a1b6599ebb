//! Phases of a migration run.

use std::fmt;

/// Where a run currently is. `Applying` and `Advancing` carry the index of
/// the script in the sorted catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Start,
    ResolvingEndpoint,
    ConnectivityCheck,
    ReadingVersion,
    Scanning,
    Applying(usize),
    Advancing(usize),
    Done,
    Failed,
}

impl RunPhase {
    /// `Done` and `Failed` end a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed)
    }

    /// Whether moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        use RunPhase::*;

        if self.is_terminal() {
            return false;
        }
        match (*self, next) {
            (_, Failed) => true,
            (Start, ResolvingEndpoint)
            | (ResolvingEndpoint, ConnectivityCheck)
            | (ConnectivityCheck, ReadingVersion)
            | (ReadingVersion, Scanning)
            | (Scanning, Done)
            | (Advancing(_), Done) => true,
            // Skipped scripts move the index forward without applying.
            (Scanning, Applying(_)) => true,
            (Applying(i), Advancing(j)) => i == j,
            (Advancing(i), Applying(j)) => j > i,
            _ => false,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Start => write!(f, "start"),
            RunPhase::ResolvingEndpoint => write!(f, "resolving endpoint"),
            RunPhase::ConnectivityCheck => write!(f, "connectivity check"),
            RunPhase::ReadingVersion => write!(f, "reading version"),
            RunPhase::Scanning => write!(f, "scanning scripts"),
            RunPhase::Applying(i) => write!(f, "applying script #{}", i + 1),
            RunPhase::Advancing(i) => write!(f, "advancing version after script #{}", i + 1),
            RunPhase::Done => write!(f, "done"),
            RunPhase::Failed => write!(f, "failed"),
        }
    }
}
