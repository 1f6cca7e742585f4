use std::io;
use std::thread::{self, Scope};
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::entry::Entry;
use crate::error::FindError;
use crate::job::{JobReport, TraversalJob};
use crate::queue::{Job, JobQueue, Wake};
use crate::results::ScanStats;
use crate::tasks::TaskSet;
use crate::traits::{Matcher, Sink};

#[cfg(test)]
thread_local! {
    /// Makes the job spawn with this index fail, counted from zero. Read by
    /// `run` on the calling thread.
    static FAIL_SPAWN: std::cell::Cell<Option<usize>> = const { std::cell::Cell::new(None) };
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Traverse everything below `root` concurrently, printing matches to `sink`.
///
/// The calling thread seeds the queue with the root, starts the dispatcher
/// thread and joins it. The dispatcher spawns one thread per queued
/// directory and returns once the queue is empty with no job in flight.
///
/// Fan-out is unbounded: a directory with N sub-directories can have N jobs
/// running at once.
pub(crate) fn run<M, S>(root: Entry, matcher: &M, sink: &S) -> Result<ScanStats, FindError>
where
    M: Matcher + ?Sized,
    S: Sink + ?Sized,
{
    let start = Instant::now();

    let queue = JobQueue::new();
    queue.push(Job::new(root));

    let worker = TraversalJob {
        matcher,
        sink,
        queue: &queue,
    };

    let dispatcher = Dispatcher {
        queue: &queue,
        worker: &worker,
        #[cfg(test)]
        fail_spawn: FAIL_SPAWN.with(std::cell::Cell::get),
    };

    let tally = thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name("parfind-dispatcher".into())
            .spawn_scoped(scope, move || dispatcher.run(scope))
            .map_err(FindError::Spawn)?;

        handle
            .join()
            .unwrap_or_else(|_| Err(FindError::Generic("dispatcher thread panicked".into())))
    })?;

    Ok(ScanStats::compute(tally, start.elapsed()))
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// What the dispatcher hands back once the traversal is over.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Tally {
    pub report: JobReport,
    pub jobs: usize,
    pub panicked: usize,
}

struct Dispatcher<'scope, M: ?Sized, S: ?Sized> {
    queue: &'scope JobQueue,
    worker: &'scope TraversalJob<'scope, M, S>,
    #[cfg(test)]
    fail_spawn: Option<usize>,
}

impl<'scope, M, S> Dispatcher<'scope, M, S>
where
    M: Matcher + ?Sized + 'scope,
    S: Sink + ?Sized + 'scope,
{
    /// Wait, reap, dispatch at most one job, repeat until drained.
    fn run<'env>(self, scope: &'scope Scope<'scope, 'env>) -> Result<Tally, FindError> {
        let mut tasks = TaskSet::new();
        let mut jobs = 0;
        let mut failure: Option<io::Error> = None;

        loop {
            let wake = self.queue.wait();

            let reaped = tasks.reap();
            if reaped > 0 {
                trace!(reaped, in_flight = tasks.len(), "reaped finished jobs");
            }

            match wake {
                Wake::Job(job, ticket) => {
                    let worker = self.worker;
                    let spawned = self.job_thread(jobs).spawn_scoped(scope, move || {
                        let _ticket = ticket;
                        worker.run(job)
                    });

                    match spawned {
                        Ok(handle) => {
                            tasks.insert(handle);
                            jobs += 1;
                        }
                        Err(e) => {
                            // The closure, and with it the ticket, has been
                            // dropped, so the job already counts as finished.
                            let discarded = self.queue.close();
                            warn!(
                                error = %e,
                                discarded,
                                "cannot spawn traversal job; abandoning traversal"
                            );
                            failure.get_or_insert(e);
                        }
                    }
                }
                Wake::Pending => {}
                Wake::Drained => break,
            }
        }

        let (report, panicked) = tasks.join_all();
        debug!(jobs, panicked, "dispatcher done");

        match failure {
            Some(e) => Err(FindError::Spawn(e)),
            None => Ok(Tally {
                report,
                jobs,
                panicked,
            }),
        }
    }

    #[cfg(not(test))]
    fn job_thread(&self, _spawned: usize) -> thread::Builder {
        thread::Builder::new()
    }

    /// A stack this large can never be mapped, so the spawn fails.
    #[cfg(test)]
    fn job_thread(&self, spawned: usize) -> thread::Builder {
        let builder = thread::Builder::new();
        if self.fail_spawn == Some(spawned) {
            return builder.stack_size(usize::MAX / 2);
        }
        builder
    }
}
