use std::io;

use crate::entry::Entry;

/// Determines whether an entry should be printed.
///
/// [`FilterSpec`](crate::FilterSpec) is the built-in implementation. Implement
/// this for custom predicates; the engine evaluates it on every candidate.
///
/// # Thread Safety
///
/// `Sync` is required: one matcher is borrowed by every traversal job and
/// called concurrently on different entries.
///
/// # Example
///
/// ```rust
/// use parfind::{Matcher, Entry};
///
/// struct ExtensionMatcher(String);
///
/// impl Matcher for ExtensionMatcher {
///     fn is_match(&self, entry: &Entry) -> bool {
///         entry.path
///             .extension()
///             .map(|e| e.eq_ignore_ascii_case(&self.0))
///             .unwrap_or(false)
///     }
/// }
/// ```
pub trait Matcher: Sync {
    /// Returns `true` if this entry should be printed.
    fn is_match(&self, entry: &Entry) -> bool;
}

/// Receives every entry that passed the matcher.
///
/// Implementations must make each call atomic with respect to the others:
/// jobs running on different threads call `emit` concurrently.
pub trait Sink: Sync {
    /// Record one matched entry.
    fn emit(&self, entry: &Entry) -> io::Result<()>;
}
