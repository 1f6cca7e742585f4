use std::path::PathBuf;
use std::time::Duration;

use crate::engine::Tally;

/// The output of a completed search.
///
/// `paths` is opt-in: enable it with `.collect_paths(true)` on the builder.
/// Without it, matches go straight to the output stream.
#[derive(Debug)]
pub struct Results {
    /// Number of entries that matched and were written out.
    pub matches: usize,

    /// Paths of matched entries, in the order jobs reported them.
    /// Only populated if `.collect_paths(true)` was set on the builder.
    pub paths: Vec<PathBuf>,

    /// Traversal statistics.
    pub stats: ScanStats,
}

/// Statistics for a completed traversal.
#[derive(Debug, Clone, Copy)]
pub struct ScanStats {
    /// Entries handed to the sink successfully.
    pub printed: usize,

    /// Directories whose children were listed.
    pub dirs: usize,

    /// Traversal jobs spawned. Zero for the sequential walker.
    pub jobs: usize,

    /// Children skipped because access to them was denied.
    pub denied: usize,

    /// Entries or listings abandoned after any other I/O error.
    pub dropped: usize,

    /// Jobs that panicked. Their branches are missing from the output.
    pub panicked: usize,

    /// Wall-clock time from search start to completion.
    pub duration: Duration,
}

impl ScanStats {
    pub(crate) fn compute(tally: Tally, duration: Duration) -> Self {
        let r = tally.report;
        Self {
            printed: r.printed,
            dirs: r.scanned,
            jobs: tally.jobs,
            denied: r.denied,
            dropped: r.dropped,
            panicked: tally.panicked,
            duration,
        }
    }

    /// Whether any part of the tree was left out because of an error.
    /// Access-denied skips are expected and do not count.
    pub fn is_complete(&self) -> bool {
        self.dropped == 0 && self.panicked == 0
    }
}
