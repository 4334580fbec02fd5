//! Registry of watched paths.
//!
//! A watched path matches itself and everything below it: watching `/a/b`
//! matches `/a/b` and `/a/b/c`, but not `/a/bc`. Paths are compared byte by
//! byte, without resolving symlinks, case folding or decoding them as utf8.

use std::{
    collections::BTreeSet,
    ffi::{OsStr, OsString},
    os::unix::ffi::OsStrExt,
};

pub const SEPARATOR: u8 = b'/';

#[derive(Debug, Clone, Default)]
pub struct WatchedPaths {
    paths: BTreeSet<OsString>,
    /// Ordered copy of `paths` scanned by the matcher, rebuilt after every
    /// mutation.
    snapshot: Vec<OsString>,
}

impl WatchedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `path`. Returns false if it was already watched.
    pub fn add(&mut self, path: impl AsRef<OsStr>) -> bool {
        let inserted = self.paths.insert(normalize(path.as_ref()).to_os_string());
        self.rebuild_snapshot();
        inserted
    }

    /// Stop watching `path`. Returns false if it wasn't watched.
    pub fn remove(&mut self, path: impl AsRef<OsStr>) -> bool {
        let removed = self.paths.remove(normalize(path.as_ref()));
        self.rebuild_snapshot();
        removed
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.rebuild_snapshot();
    }

    pub fn snapshot(&self) -> &[OsString] {
        &self.snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Returns true if `candidate` is a watched path or lies below one.
    pub fn is_watched(&self, candidate: impl AsRef<OsStr>) -> bool {
        let candidate = candidate.as_ref();
        match self
            .snapshot
            .iter()
            .find(|watched| is_within(candidate.as_bytes(), watched.as_bytes()))
        {
            Some(watched) => {
                log::trace!("{candidate:?} matched {watched:?}");
                true
            }
            None => {
                log::trace!("{candidate:?} matched none of {} paths", self.len());
                false
            }
        }
    }

    fn rebuild_snapshot(&mut self) {
        self.snapshot = self.paths.iter().cloned().collect();
    }
}

/// Strip any trailing separator. `/` becomes the empty string, which is a
/// prefix of every absolute path.
pub fn normalize(path: &OsStr) -> &OsStr {
    let bytes = path.as_bytes();
    let end = bytes
        .iter()
        .rposition(|&c| c != SEPARATOR)
        .map_or(0, |last| last + 1);
    OsStr::from_bytes(&bytes[..end])
}

/// `candidate` is `watched` itself or a path below it.
pub fn is_within(candidate: &[u8], watched: &[u8]) -> bool {
    match candidate.strip_prefix(watched) {
        Some(rest) => rest.first().is_none_or(|&c| c == SEPARATOR),
        None => false,
    }
}
