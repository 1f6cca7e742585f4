use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::engine;
use crate::entry::Entry;
use crate::error::FindError;
use crate::filter::{FilterSpec, NamePattern, TypeFilter};
use crate::results::{Results, ScanStats};
use crate::sequential;
use crate::sink::{OutputSink, PathCollector};
use crate::traits::{Matcher, Sink};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How the tree is traversed. Both strategies print the same set of paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// A dispatcher thread spawning one job thread per directory.
    #[default]
    Concurrent,

    /// A depth-first walk on the calling thread.
    Sequential,
}

// ---------------------------------------------------------------------------
// FinderBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a search.
///
/// Created via [`parfind::find()`](crate::find). Configure with chained
/// builder methods, then call [`run()`](FinderBuilder::run) to print matches
/// to stdout, or [`run_with()`](FinderBuilder::run_with) to send them to any
/// [`Sink`].
///
/// # Example
///
/// ```rust,no_run
/// use parfind::TypeFilter;
///
/// let results = parfind::find()
///     .root("/var/log")
///     .type_filter(TypeFilter::Files)
///     .name("*.log")
///     .run()?;
/// eprintln!("{} matches", results.matches);
/// # Ok::<(), parfind::FindError>(())
/// ```
#[derive(Default)]
pub struct FinderBuilder {
    root: Option<PathBuf>,
    filter: FilterSpec,
    kind: Option<TypeFilter>,
    name: Option<String>,
    iname: Option<String>,
    matcher: Option<Box<dyn Matcher>>,
    strategy: Strategy,
    collect_paths: bool,
}

impl FinderBuilder {
    // ── Root ──────────────────────────────────────────────────────────────

    /// The directory to search. Required.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    // ── Filters ───────────────────────────────────────────────────────────

    /// Start from an already-built [`FilterSpec`]. Filters set with the
    /// individual methods below take precedence over its fields.
    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filter = spec;
        self
    }

    /// Only print directories, or only regular files.
    pub fn type_filter(mut self, kind: TypeFilter) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Only print entries whose file name matches `glob` (`*` is the only
    /// wildcard).
    pub fn name(mut self, glob: impl Into<String>) -> Self {
        self.name = Some(glob.into());
        self
    }

    /// Like [`name()`](Self::name), ignoring case.
    pub fn iname(mut self, glob: impl Into<String>) -> Self {
        self.iname = Some(glob.into());
        self
    }

    /// Replace the filter entirely with a custom matcher. Any filter set
    /// through the other methods is ignored.
    pub fn with_matcher(mut self, m: impl Matcher + 'static) -> Self {
        self.matcher = Some(Box::new(m));
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Collect matched paths into [`Results::paths`].
    ///
    /// With [`run()`](Self::run) this replaces printing to stdout; with
    /// [`run_with()`](Self::run_with) the sink still receives every match.
    pub fn collect_paths(mut self, yes: bool) -> Self {
        self.collect_paths = yes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the search, printing one matched path per line to stdout.
    ///
    /// # Errors
    ///
    /// Returns `Err` before any output when the root is missing, does not
    /// exist or is not a directory, or a name pattern is invalid. Errors met
    /// during traversal never abort it; see [`ScanStats`].
    pub fn run(self) -> Result<Results, FindError> {
        if self.collect_paths {
            let collector = PathCollector::new();
            let mut results = self.execute(&collector)?;
            results.paths = collector.into_paths();
            return Ok(results);
        }

        let stdout = OutputSink::new(BufWriter::new(io::stdout()));
        let results = self.execute(&stdout)?;
        finish_output(stdout.flush())?;
        Ok(results)
    }

    /// Execute the search, sending every match to `sink`.
    pub fn run_with<S: Sink>(self, sink: &S) -> Result<Results, FindError> {
        if !self.collect_paths {
            return self.execute(sink);
        }

        let tee = Tee {
            sink,
            collector: PathCollector::new(),
        };
        let mut results = self.execute(&tee)?;
        results.paths = tee.collector.into_paths();
        Ok(results)
    }

    fn execute<S: Sink + ?Sized>(self, sink: &S) -> Result<Results, FindError> {
        let root = self.root.as_deref().ok_or(FindError::PathAbsent)?;
        let root = observe_root(root)?;

        let stats = match &self.matcher {
            Some(m) => self.strategy.traverse(root, &**m, sink)?,
            None => {
                let spec = self.compile_filter()?;
                self.strategy.traverse(root, &spec, sink)?
            }
        };

        debug!(
            matches = stats.printed,
            dirs = stats.dirs,
            jobs = stats.jobs,
            denied = stats.denied,
            dropped = stats.dropped,
            elapsed_ms = stats.duration.as_millis() as u64,
            "search finished"
        );

        Ok(Results {
            matches: stats.printed,
            paths: Vec::new(),
            stats,
        })
    }

    fn compile_filter(&self) -> Result<FilterSpec, FindError> {
        let mut spec = self.filter.clone();
        if let Some(kind) = self.kind {
            spec.kind = Some(kind);
        }
        if let Some(glob) = &self.name {
            spec.name = Some(NamePattern::new(glob, false)?);
        }
        if let Some(glob) = &self.iname {
            spec.iname = Some(NamePattern::new(glob, true)?);
        }
        Ok(spec)
    }
}

impl Strategy {
    fn traverse<M, S>(self, root: Entry, matcher: &M, sink: &S) -> Result<ScanStats, FindError>
    where
        M: Matcher + ?Sized,
        S: Sink + ?Sized,
    {
        match self {
            Strategy::Concurrent => engine::run(root, matcher, sink),
            Strategy::Sequential => Ok(sequential::run(root, matcher, sink)),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Check that `path` exists and is a directory (following symlinks), then
/// observe it as the root entry.
fn observe_root(path: &Path) -> Result<Entry, FindError> {
    let meta = fs::metadata(path).map_err(|_| FindError::PathNotExist(path.to_path_buf()))?;
    if !meta.is_dir() {
        return Err(FindError::PathNotDir(path.to_path_buf()));
    }
    Entry::root(path).map_err(|_| FindError::PathNotExist(path.to_path_buf()))
}

/// A reader that went away (`parfind ... | head`) is not a failure.
fn finish_output(flushed: io::Result<()>) -> Result<(), FindError> {
    match flushed {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("output closed by reader");
            Ok(())
        }
        other => other.map_err(FindError::Output),
    }
}

/// Forwards every match to a caller's sink while also collecting its path.
struct Tee<'a, S: ?Sized> {
    sink: &'a S,
    collector: PathCollector,
}

impl<S: Sink + ?Sized> Sink for Tee<'_, S> {
    fn emit(&self, entry: &Entry) -> io::Result<()> {
        self.sink.emit(entry)?;
        self.collector.emit(entry)
    }
}
