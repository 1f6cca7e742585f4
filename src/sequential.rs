use std::io;
use std::time::Instant;

use ignore::WalkBuilder;
use tracing::debug;

use crate::engine::Tally;
use crate::entry::Entry;
use crate::job::JobReport;
use crate::results::ScanStats;
use crate::traits::{Matcher, Sink};

/// Walk `root` depth-first on the calling thread.
///
/// Applies the same rules as the concurrent engine: the root itself is
/// filtered and printed, symlinks to directories contribute nothing, other
/// symlinks are leaves, and unreadable entries are skipped. Given the same
/// tree, both strategies print the same set of lines.
pub(crate) fn run<M, S>(root: Entry, matcher: &M, sink: &S) -> ScanStats
where
    M: Matcher + ?Sized,
    S: Sink + ?Sized,
{
    let start = Instant::now();
    let mut report = JobReport::default();

    if root.is_symlink() {
        return ScanStats::compute(Tally::default(), start.elapsed());
    }

    let walker = WalkBuilder::new(&root.path)
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(false)
        .same_file_system(false)
        .build();

    for res in walker {
        let dent = match res {
            Ok(dent) => dent,
            Err(e) => {
                let denied = e
                    .io_error()
                    .is_some_and(|io| io.kind() == io::ErrorKind::PermissionDenied);
                if !denied {
                    debug!(error = %e, "walk error");
                    report.dropped += 1;
                }
                continue;
            }
        };

        let entry = if dent.depth() == 0 {
            root.clone()
        } else {
            let Some(ft) = dent.file_type() else {
                continue;
            };
            match Entry::classify(dent.path().to_path_buf(), ft, dent.depth()) {
                Ok(entry) => entry,
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    report.denied += 1;
                    continue;
                }
                Err(e) => {
                    debug!(path = %dent.path().display(), error = %e, "cannot read entry");
                    report.dropped += 1;
                    continue;
                }
            }
        };

        if entry.is_symlink() && entry.is_dir() {
            continue;
        }
        if entry.is_dir() {
            report.scanned += 1;
        }

        if matcher.is_match(&entry) {
            match sink.emit(&entry) {
                Ok(()) => report.printed += 1,
                Err(e) => debug!(path = %entry.path.display(), error = %e, "write failed"),
            }
        }
    }

    let tally = Tally {
        report,
        ..Tally::default()
    };
    ScanStats::compute(tally, start.elapsed())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::filter::{FilterSpec, NamePattern};
    use crate::sink::PathCollector;

    #[test]
    fn walks_whole_tree_including_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a").join("b")).unwrap();
        fs::write(root.join(".hidden"), "").unwrap();
        fs::write(root.join(".gitignore"), "*.log\n").unwrap();
        fs::write(root.join("a").join("b").join("x.log"), "").unwrap();

        let sink = PathCollector::new();
        let stats = run(Entry::root(root).unwrap(), &FilterSpec::default(), &sink);

        let mut paths = sink.into_paths();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                root.to_path_buf(),
                root.join(".gitignore"),
                root.join(".hidden"),
                root.join("a"),
                root.join("a").join("b"),
                root.join("a").join("b").join("x.log"),
            ]
        );
        assert_eq!(stats.jobs, 0);
        assert_eq!(stats.dirs, 3);
    }

    #[test]
    fn applies_name_filter() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("logs")).unwrap();
        fs::write(root.join("logs").join("app.log"), "").unwrap();
        fs::write(root.join("logs").join("app.log.bak"), "").unwrap();

        let spec = FilterSpec {
            name: Some(NamePattern::new("*.log", false).unwrap()),
            ..FilterSpec::default()
        };
        let sink = PathCollector::new();
        run(Entry::root(root).unwrap(), &spec, &sink);

        assert_eq!(sink.into_paths(), vec![root.join("logs").join("app.log")]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let sink = PathCollector::new();
        run(Entry::root(&dir.path().join("link")).unwrap(), &FilterSpec::default(), &sink);
        assert!(sink.into_paths().is_empty());
    }
}
