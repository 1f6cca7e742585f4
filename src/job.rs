use std::fs;
use std::io;

use tracing::{debug, trace};

use crate::entry::Entry;
use crate::queue::{Job, JobQueue};
use crate::traits::{Matcher, Sink};

/// Counters produced by one traversal job. The dispatcher folds them into
/// the run's [`ScanStats`](crate::ScanStats).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct JobReport {
    /// Entries handed to the sink successfully.
    pub printed: usize,
    /// Directories whose children were listed.
    pub scanned: usize,
    /// Children omitted because their metadata was access-restricted.
    pub denied: usize,
    /// Children or listings abandoned because of any other I/O error.
    pub dropped: usize,
}

impl JobReport {
    pub fn merge(&mut self, other: &JobReport) {
        self.printed += other.printed;
        self.scanned += other.scanned;
        self.denied += other.denied;
        self.dropped += other.dropped;
    }
}

/// Everything a job borrows from the run that spawned it.
pub(crate) struct TraversalJob<'a, M: ?Sized, S: ?Sized> {
    pub matcher: &'a M,
    pub sink: &'a S,
    pub queue: &'a JobQueue,
}

impl<M, S> TraversalJob<'_, M, S>
where
    M: Matcher + ?Sized,
    S: Sink + ?Sized,
{
    /// Scan one directory entry: print it if it matches, print its matching
    /// non-directory children, and queue its sub-directories.
    ///
    /// Symlinks are neither printed nor followed. Errors never escape; they
    /// end up as counters in the returned report.
    pub fn run(&self, job: Job) -> JobReport {
        let entry = job.entry;
        let mut report = JobReport::default();

        if entry.is_symlink() {
            trace!(path = %entry.path.display(), "skipping symlink");
            return report;
        }

        self.emit(&entry, &mut report);

        let children = match fs::read_dir(&entry.path) {
            Ok(children) => children,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return report,
            Err(e) => {
                debug!(path = %entry.path.display(), error = %e, "cannot list directory");
                report.dropped += 1;
                return report;
            }
        };
        report.scanned += 1;

        for dent in children {
            let dent = match dent {
                Ok(dent) => dent,
                Err(e) => {
                    // The listing itself broke; nothing further can be trusted.
                    debug!(path = %entry.path.display(), error = %e, "directory listing failed");
                    report.dropped += 1;
                    return report;
                }
            };

            let child = match Entry::from_dir_entry(&dent, entry.depth + 1) {
                Ok(child) => child,
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    report.denied += 1;
                    continue;
                }
                Err(e) => {
                    debug!(path = %dent.path().display(), error = %e, "cannot read entry");
                    report.dropped += 1;
                    continue;
                }
            };

            if child.is_dir() {
                self.queue.push(Job::new(child));
            } else {
                self.emit(&child, &mut report);
            }
        }

        report
    }

    fn emit(&self, entry: &Entry, report: &mut JobReport) {
        if !self.matcher.is_match(entry) {
            return;
        }
        match self.sink.emit(entry) {
            Ok(()) => report.printed += 1,
            Err(e) => debug!(path = %entry.path.display(), error = %e, "write failed"),
        }
    }
}
