use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A single file-system object observed during traversal.
///
/// Type information is read once, when the entry is created, and never
/// refreshed. `kind` describes what the path resolves to (a symlink to a
/// regular file has kind [`EntryKind::File`]); `symlink` records whether the
/// path itself is a symbolic link.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Full path to the entry, as built from the root the search started at.
    pub path: PathBuf,

    /// The file name component, in native encoding. Name filters only ever
    /// look at this.
    pub name: OsString,

    /// What the path resolves to.
    pub kind: EntryKind,

    /// Whether the path itself is a symbolic link.
    pub symlink: bool,

    /// How deep below the root this entry was found. Root = 0.
    pub depth: usize,
}

/// The resolved kind of a traversed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// Anything else (device files, pipes, sockets, dangling links, etc.).
    Other,
}

impl EntryKind {
    fn from_file_type(ft: fs::FileType) -> Self {
        if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

impl Entry {
    /// Observe the search root. The root has already been validated as an
    /// existing directory, but it may still be a symlink to one.
    pub fn root(path: &Path) -> io::Result<Self> {
        let symlink = fs::symlink_metadata(path)?.file_type().is_symlink();
        let kind = EntryKind::from_file_type(fs::metadata(path)?.file_type());
        Ok(Self::new(path.to_path_buf(), kind, symlink, 0))
    }

    /// Observe a child produced by `read_dir`.
    ///
    /// Symlinks are resolved with one extra `stat` to learn the target kind.
    /// A dangling link resolves to [`EntryKind::Other`]; any other failure
    /// (notably permission denied) is returned so the caller can decide.
    pub fn from_dir_entry(dent: &fs::DirEntry, depth: usize) -> io::Result<Self> {
        let ft = dent.file_type()?;
        Self::classify(dent.path(), ft, depth)
    }

    /// Build an entry from a path and its unresolved (`lstat`) file type.
    pub(crate) fn classify(path: PathBuf, ft: fs::FileType, depth: usize) -> io::Result<Self> {
        if !ft.is_symlink() {
            return Ok(Self::new(path, EntryKind::from_file_type(ft), false, depth));
        }

        let kind = match fs::metadata(&path) {
            Ok(meta) => EntryKind::from_file_type(meta.file_type()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => EntryKind::Other,
            Err(e) => return Err(e),
        };
        Ok(Self::new(path, kind, true, depth))
    }

    fn new(path: PathBuf, kind: EntryKind, symlink: bool, depth: usize) -> Self {
        let name = path
            .file_name()
            .unwrap_or(path.as_os_str())
            .to_os_string();
        Self { path, name, kind, symlink, depth }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_symlink(&self) -> bool {
        self.symlink
    }
}
