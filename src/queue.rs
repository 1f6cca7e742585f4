//! Pending-work FIFO shared by the dispatcher and its traversal jobs.
//!
//! One mutex guards the queued jobs together with the count of jobs in
//! flight, and one condition variable wakes the dispatcher whenever either
//! changes. Jobs push from any thread; only the dispatcher pops.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::entry::Entry;

/// One directory awaiting a scan.
#[derive(Debug)]
pub(crate) struct Job {
    pub entry: Entry,
}

impl Job {
    pub fn new(entry: Entry) -> Self {
        Self { entry }
    }
}

#[derive(Default)]
struct State {
    queue: VecDeque<Job>,
    /// Jobs handed out by `wait` whose ticket has not been dropped yet.
    running: usize,
    /// Tickets dropped since the dispatcher last woke.
    finished: usize,
    /// Set once the dispatcher stops accepting work.
    closed: bool,
}

/// What the dispatcher should do after waking.
pub(crate) enum Wake<'q> {
    /// Run this job. The ticket must travel with it and be dropped when the
    /// job is over, however it ends.
    Job(Job, Ticket<'q>),
    /// Nothing queued, but jobs are still in flight and may queue more.
    Pending,
    /// Nothing queued and nothing in flight: the traversal is complete.
    Drained,
}

#[derive(Default)]
pub(crate) struct JobQueue {
    state: Mutex<State>,
    wake: Condvar,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job and wake the dispatcher. Dropped silently once the queue
    /// has been closed.
    pub fn push(&self, job: Job) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.queue.push_back(job);
        self.wake.notify_one();
    }

    /// Block until a job is queued, a job finished, or nothing is in flight.
    ///
    /// Pops at most one job per call. Dispatcher thread only.
    pub fn wait(&self) -> Wake<'_> {
        let mut state = self
            .wake
            .wait_while(self.lock(), |s| {
                s.queue.is_empty() && s.finished == 0 && s.running > 0
            })
            .unwrap_or_else(PoisonError::into_inner);

        state.finished = 0;
        match state.queue.pop_front() {
            Some(job) => {
                state.running += 1;
                Wake::Job(job, Ticket { queue: self })
            }
            None if state.running == 0 => Wake::Drained,
            None => Wake::Pending,
        }
    }

    /// Stop accepting work: discard everything queued and ignore later pushes.
    /// Jobs already in flight still report completion.
    pub fn close(&self) -> usize {
        let mut state = self.lock();
        state.closed = true;
        let discarded = state.queue.len();
        state.queue.clear();
        discarded
    }

    fn finish(&self) {
        let mut state = self.lock();
        state.running -= 1;
        state.finished += 1;
        self.wake.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().queue.len()
    }
}

/// Proof that a popped job is in flight. Dropping it, including while
/// unwinding from a panic, marks the job finished and wakes the dispatcher.
pub(crate) struct Ticket<'q> {
    queue: &'q JobQueue,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.queue.finish();
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn job(name: &str) -> Job {
        let dir = std::env::temp_dir();
        let mut entry = Entry::root(&dir).unwrap();
        entry.path = Path::new(&dir).join(name);
        entry.name = name.into();
        Job::new(entry)
    }

    fn expect_job(wake: Wake<'_>) -> (Job, Ticket<'_>) {
        match wake {
            Wake::Job(job, ticket) => (job, ticket),
            Wake::Pending => panic!("expected a job, got Pending"),
            Wake::Drained => panic!("expected a job, got Drained"),
        }
    }

    #[test]
    fn empty_queue_with_nothing_in_flight_is_drained() {
        let q = JobQueue::new();
        assert!(matches!(q.wait(), Wake::Drained));
    }

    #[test]
    fn pops_in_fifo_order() {
        let q = JobQueue::new();
        q.push(job("a"));
        q.push(job("b"));
        q.push(job("c"));

        let mut names = Vec::new();
        for _ in 0..3 {
            let (job, _ticket) = expect_job(q.wait());
            names.push(job.entry.name);
        }
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn finished_ticket_wakes_once_then_drains() {
        let q = JobQueue::new();
        q.push(job("a"));
        let (_job, ticket) = expect_job(q.wait());
        drop(ticket);

        // The completion is reported once, after which nothing is left.
        assert!(matches!(q.wait(), Wake::Drained));
    }

    #[test]
    fn in_flight_job_keeps_dispatcher_pending() {
        let q = JobQueue::new();
        q.push(job("a"));
        q.push(job("b"));
        let (_a, ticket_a) = expect_job(q.wait());
        let (_b, ticket_b) = expect_job(q.wait());

        drop(ticket_a);
        // b is still running, so the wake after a's completion is not final.
        assert!(matches!(q.wait(), Wake::Pending));
        drop(ticket_b);
        assert!(matches!(q.wait(), Wake::Drained));
    }

    #[test]
    fn push_from_another_thread_wakes_waiter() {
        let q = &JobQueue::new();
        q.push(job("root"));
        let (_root, ticket) = expect_job(q.wait());

        thread::scope(|s| {
            s.spawn(move || {
                thread::sleep(Duration::from_millis(20));
                q.push(job("child"));
                drop(ticket);
            });

            let (child, _t) = expect_job(q.wait());
            assert_eq!(child.entry.name, "child");
        });
    }

    #[test]
    fn close_discards_queued_and_future_jobs() {
        let q = JobQueue::new();
        q.push(job("a"));
        q.push(job("b"));
        assert_eq!(q.close(), 2);
        q.push(job("c"));
        assert_eq!(q.len(), 0);
        assert!(matches!(q.wait(), Wake::Drained));
    }
}
