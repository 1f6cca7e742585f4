use std::ffi::OsStr;
use std::fmt;
use std::str::FromStr;

use regex::bytes::{Regex, RegexBuilder};

use crate::entry::Entry;
use crate::error::FindError;
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// TypeFilter
// ---------------------------------------------------------------------------

/// Restricts output to one kind of entry (`-type d` / `-type f`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    Directories,
    Files,
}

impl TypeFilter {
    fn accepts(self, entry: &Entry) -> bool {
        match self {
            TypeFilter::Directories => entry.is_dir(),
            TypeFilter::Files => entry.is_file(),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = FindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d" => Ok(TypeFilter::Directories),
            "f" => Ok(TypeFilter::Files),
            other => Err(FindError::InvalidType(other.to_string())),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeFilter::Directories => "directories",
            TypeFilter::Files => "files",
        })
    }
}

// ---------------------------------------------------------------------------
// NamePattern
// ---------------------------------------------------------------------------

/// A glob over file names where `*` is the only wildcard.
///
/// Every other character is literal. The compiled matcher is anchored at
/// both ends, so `*.log` matches `app.log` but not `app.log.bak`. Matching
/// runs on the name's native bytes; `*` also spans bytes that are not valid
/// UTF-8.
#[derive(Clone)]
pub struct NamePattern {
    glob: String,
    regex: Regex,
}

impl NamePattern {
    pub fn new(glob: &str, case_insensitive: bool) -> Result<Self, FindError> {
        let body = glob
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("(?s-u:.)*");

        let regex = RegexBuilder::new(&format!("^(?:{body})$"))
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source| FindError::InvalidPattern {
                pattern: glob.to_string(),
                source,
            })?;

        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, name: impl AsRef<OsStr>) -> bool {
        self.regex.is_match(name.as_ref().as_encoded_bytes())
    }

    /// The glob this pattern was compiled from.
    pub fn glob(&self) -> &str {
        &self.glob
    }
}

impl fmt::Debug for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamePattern").field(&self.glob).finish()
    }
}

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// The full set of criteria for one run. Every present filter must pass;
/// absent filters always pass.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub kind: Option<TypeFilter>,
    pub name: Option<NamePattern>,
    pub iname: Option<NamePattern>,
}

impl FilterSpec {
    /// Whether `entry` should be printed. Only the file name component is
    /// tested against the name patterns.
    pub fn should_print(&self, entry: &Entry) -> bool {
        self.kind.map_or(true, |k| k.accepts(entry))
            && self.name.as_ref().map_or(true, |p| p.is_match(&entry.name))
            && self.iname.as_ref().map_or(true, |p| p.is_match(&entry.name))
    }
}

impl Matcher for FilterSpec {
    fn is_match(&self, entry: &Entry) -> bool {
        self.should_print(entry)
    }
}
