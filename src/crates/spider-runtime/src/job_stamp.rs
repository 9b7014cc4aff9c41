//! An LRT's job stamp: how many jobs it has completed so far this
//! iteration.
//!
//! Grounded on the teacher's `ChannelVersion`/`versions_seen` pattern
//! (`langgraph-core`'s Pregel checkpoint): a small monotonically increasing
//! counter compared with plain `Ord`, so one LRT can tell whether another
//! has made enough progress to satisfy a wait constraint (§4.6, §5
//! ordering guarantee ii) without either side needing to see the other's
//! full job history.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct JobStamp(pub u64);

impl JobStamp {
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether this stamp reports enough completed jobs to satisfy an
    /// execution constraint whose `exec_index` is the 0-based slot of the
    /// predecessor job being waited on (a constraint for slot *k* is
    /// satisfied once *k+1* jobs on that LRT have finished).
    pub fn satisfies(self, exec_index: u32) -> bool {
        self.0 > exec_index as u64
    }
}

impl fmt::Display for JobStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_does_not_satisfy_any_constraint() {
        assert!(!JobStamp::zero().satisfies(0));
    }

    #[test]
    fn one_completed_job_satisfies_slot_zero() {
        assert!(JobStamp::zero().next().satisfies(0));
        assert!(!JobStamp::zero().next().satisfies(1));
    }
}
