//! # parfind
//!
//! `find`-style file search with a concurrent traversal engine.
//!
//! Give it a root directory and optional filters (entry type, name glob,
//! case-insensitive name glob) and it prints every matching path below the
//! root, one per line.
//!
//! The default [`Strategy::Concurrent`] engine runs a single dispatcher
//! thread that pops directories off a shared FIFO and spawns one job thread
//! per directory. Each job prints its matching entries and pushes the
//! sub-directories it discovers back onto the queue. The dispatcher stops
//! once the queue is empty and no job is left in flight.
//! [`Strategy::Sequential`] walks the same tree on the calling thread and
//! prints the same set of paths.
//!
//! Symbolic links to directories are never followed: they print nothing and
//! nothing below them is visited.
//!
//! # Quick Start
//!
//! ```rust
//! use parfind::TypeFilter;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("app.log"), "").unwrap();
//! std::fs::write(dir.path().join("app.log.bak"), "").unwrap();
//!
//! let results = parfind::find()
//!     .root(dir.path())
//!     .type_filter(TypeFilter::Files)
//!     .name("*.log")
//!     .collect_paths(true)
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(results.matches, 1);
//! assert_eq!(results.paths, vec![dir.path().join("app.log")]);
//! ```
//!
//! # Custom Matchers and Sinks
//!
//! Implement [`Matcher`] to replace the built-in [`FilterSpec`], and
//! [`Sink`] to send matches somewhere other than stdout:
//!
//! ```rust
//! use std::io;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use parfind::{Entry, Matcher, Sink};
//!
//! struct Empty;
//!
//! impl Matcher for Empty {
//!     fn is_match(&self, entry: &Entry) -> bool {
//!         entry.is_file() && entry.path.metadata().map(|m| m.len() == 0).unwrap_or(false)
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Count(AtomicUsize);
//!
//! impl Sink for Count {
//!     fn emit(&self, _entry: &Entry) -> io::Result<()> {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("empty"), "").unwrap();
//! std::fs::write(dir.path().join("full"), "data").unwrap();
//!
//! let count = Count::default();
//! parfind::find()
//!     .root(dir.path())
//!     .with_matcher(Empty)
//!     .run_with(&count)
//!     .unwrap();
//! assert_eq!(count.0.load(Ordering::Relaxed), 1);
//! ```

#![forbid(unsafe_code)]

mod builder;
mod engine;
mod entry;
mod error;
mod filter;
mod job;
mod queue;
mod results;
mod sequential;
mod sink;
mod tasks;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{FinderBuilder, Strategy};
pub use entry::{Entry, EntryKind};
pub use error::FindError;
pub use filter::{FilterSpec, NamePattern, TypeFilter};
pub use results::{Results, ScanStats};
pub use sink::{OutputSink, PathCollector};
pub use traits::{Matcher, Sink};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`FinderBuilder`] to configure and run a search.
pub fn find() -> FinderBuilder {
    FinderBuilder::default()
}
