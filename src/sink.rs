use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::entry::Entry;
use crate::traits::Sink;

/// Writes one matched path per line to a shared stream.
///
/// Each line is assembled first and handed to the writer in a single
/// `write_all` while the lock is held, so lines from concurrent jobs never
/// interleave.
pub struct OutputSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> OutputSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn print(&self, entry: &Entry) -> io::Result<()> {
        let mut line = entry.path.as_os_str().as_encoded_bytes().to_vec();
        line.push(b'\n');
        self.lock().write_all(&line)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Sink for OutputSink<W> {
    fn emit(&self, entry: &Entry) -> io::Result<()> {
        self.print(entry)
    }
}

/// Collects matched paths in memory, in the order jobs reported them.
#[derive(Default)]
pub struct PathCollector {
    paths: Mutex<Vec<PathBuf>>,
}

impl PathCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for PathCollector {
    fn emit(&self, entry: &Entry) -> io::Result<()> {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.path.clone());
        Ok(())
    }
}
