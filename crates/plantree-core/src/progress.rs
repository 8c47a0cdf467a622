//! Aggregate completion progress over a container's direct children.

use crate::document::{DocumentMeta, Status};

/// Point-in-time completion aggregate for one container.
///
/// Never constructed with `total == 0`: a container with no counted
/// children has no snapshot at all, so callers can tell "no children"
/// apart from "all incomplete".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total: u32,
    pub completed: u32,
}

impl ProgressSnapshot {
    /// Completion percentage, floor division. `total` is always
    /// non-zero by construction.
    pub fn percentage(&self) -> u32 {
        100 * self.completed / self.total
    }

    /// Short display string, e.g. `2/5 · 40%`.
    pub fn display(&self) -> String {
        format!("{}/{} · {}%", self.completed, self.total, self.percentage())
    }
}

/// How child statuses are counted.
///
/// Whether cancelled/deferred items should count against a container
/// was never a confirmed contract, so the exclusion set is policy
/// rather than hard-wired. The default excludes Cancelled and
/// Deferred from both the numerator and the denominator, and counts
/// Completed and Archived as done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressPolicy {
    excluded: Vec<Status>,
    completed: Vec<Status>,
}

impl ProgressPolicy {
    pub fn new(excluded: Vec<Status>, completed: Vec<Status>) -> ProgressPolicy {
        ProgressPolicy {
            excluded,
            completed,
        }
    }

    /// Classify one child: `None` when excluded from both counts,
    /// otherwise whether it counts as complete. An unreadable child is
    /// counted as incomplete so broken files still show up as pending
    /// work.
    pub fn classify(&self, meta: &DocumentMeta) -> Option<bool> {
        let Some(status) = meta.status() else {
            return Some(false);
        };
        if self.excluded.contains(status) {
            return None;
        }
        Some(self.completed.contains(status))
    }
}

impl Default for ProgressPolicy {
    fn default() -> ProgressPolicy {
        ProgressPolicy {
            excluded: vec![Status::Cancelled, Status::Deferred],
            completed: vec![Status::Completed, Status::Archived],
        }
    }
}

/// Tally a container's direct children into a snapshot.
///
/// Returns `None` when no children remain after exclusion.
pub fn compute<'a, I>(children: I, policy: &ProgressPolicy) -> Option<ProgressSnapshot>
where
    I: IntoIterator<Item = &'a DocumentMeta>,
{
    let mut total = 0u32;
    let mut completed = 0u32;
    for meta in children {
        if let Some(done) = policy.classify(meta) {
            total += 1;
            if done {
                completed += 1;
            }
        }
    }
    if total == 0 {
        return None;
    }
    Some(ProgressSnapshot { total, completed })
}
