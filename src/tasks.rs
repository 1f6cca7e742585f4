use std::thread::ScopedJoinHandle;

use tracing::warn;

use crate::job::JobReport;

/// Handles of the traversal jobs the dispatcher has spawned and not yet
/// reaped. Owned by the dispatcher thread alone.
pub(crate) struct TaskSet<'scope> {
    handles: Vec<ScopedJoinHandle<'scope, JobReport>>,
    /// Reports of every job reaped so far, folded together.
    total: JobReport,
    panicked: usize,
}

impl<'scope> TaskSet<'scope> {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            total: JobReport::default(),
            panicked: 0,
        }
    }

    pub fn insert(&mut self, handle: ScopedJoinHandle<'scope, JobReport>) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Join every handle whose thread has already finished. Never blocks on
    /// a running job. Returns how many were reaped.
    pub fn reap(&mut self) -> usize {
        let before = self.handles.len();
        let mut i = 0;
        while i < self.handles.len() {
            if self.handles[i].is_finished() {
                let handle = self.handles.swap_remove(i);
                self.collect(handle);
            } else {
                i += 1;
            }
        }
        before - self.handles.len()
    }

    /// Join everything still held, blocking as needed, and return the
    /// combined report.
    pub fn join_all(mut self) -> (JobReport, usize) {
        for handle in std::mem::take(&mut self.handles) {
            self.collect(handle);
        }
        (self.total, self.panicked)
    }

    fn collect(&mut self, handle: ScopedJoinHandle<'scope, JobReport>) {
        match handle.join() {
            Ok(report) => self.total.merge(&report),
            Err(_) => {
                warn!("traversal job panicked; its branch was dropped");
                self.panicked += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    fn wait_until_finished(tasks: &TaskSet<'_>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while tasks.handles.iter().any(|h| !h.is_finished()) {
            assert!(Instant::now() < deadline, "tasks did not finish");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn reap_only_removes_finished_handles() {
        let (release, gate) = mpsc::channel::<()>();

        thread::scope(|s| {
            let mut tasks = TaskSet::new();
            tasks.insert(s.spawn(|| JobReport {
                printed: 1,
                ..JobReport::default()
            }));
            tasks.insert(s.spawn(move || {
                gate.recv().ok();
                JobReport {
                    printed: 2,
                    ..JobReport::default()
                }
            }));

            let deadline = Instant::now() + Duration::from_secs(5);
            while tasks.reap() == 0 {
                assert!(Instant::now() < deadline, "first task never finished");
                thread::sleep(Duration::from_millis(1));
            }
            assert_eq!(tasks.len(), 1);

            release.send(()).unwrap();
            wait_until_finished(&tasks);
            assert_eq!(tasks.reap(), 1);
            assert_eq!(tasks.len(), 0);

            let (total, panicked) = tasks.join_all();
            assert_eq!(total.printed, 3);
            assert_eq!(panicked, 0);
        });
    }

    #[test]
    fn panicking_job_is_counted_not_propagated() {
        thread::scope(|s| {
            let mut tasks = TaskSet::new();
            tasks.insert(s.spawn(|| -> JobReport { panic!("boom") }));
            tasks.insert(s.spawn(JobReport::default));

            let (_, panicked) = tasks.join_all();
            assert_eq!(panicked, 1);
        });
    }
}
