//! Process command-line cache.
//!
//! Reading `/proc/<pid>/cmdline` for every window on every match would be
//! wasteful, and a process's command line never changes while it runs, so
//! the first read for a pid is kept for the lifetime of the engine.
//!
//! A failed read is cached as the empty string and never retried: a
//! process that disappeared and one whose record is unreadable look the
//! same from here.

use crate::traits::ProcessTable;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// [`ProcessTable`] backed by the Linux `procfs`.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

impl ProcFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read records from `<root>/<pid>/cmdline` instead of `/proc`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ProcessTable for ProcFs {
    fn cmdline(&self, pid: u32) -> Option<Vec<u8>> {
        let path = self.root.join(pid.to_string()).join("cmdline");
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!("cannot read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Turn a raw NUL-separated argument record into one space-joined string.
fn decode_cmdline(raw: &[u8]) -> String {
    let mut end = raw.len();
    while end > 0 && raw[end - 1] == 0 {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).replace('\0', " ")
}

/// Memoizes command lines per process id.
///
/// Entries are stored as read; callers lower-case at comparison time.
/// The cache uses a [`RefCell`], so it (and anything owning it) is not
/// `Sync`: lookups are expected to be serialized by the caller.
pub struct CmdlineCache<P: ProcessTable> {
    procs: P,
    entries: RefCell<HashMap<u32, String>>,
}

impl<P: ProcessTable> CmdlineCache<P> {
    pub fn new(procs: P) -> Self {
        Self {
            procs,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Command line of `pid`, or the empty string if it could not be read.
    pub fn lookup(&self, pid: u32) -> String {
        if let Some(cmd) = self.entries.borrow().get(&pid) {
            return cmd.clone();
        }
        let cmd = self
            .procs
            .cmdline(pid)
            .map(|raw| decode_cmdline(&raw))
            .unwrap_or_default();
        debug!("cmdline for pid {}: {:?}", pid, cmd);
        self.entries.borrow_mut().insert(pid, cmd.clone());
        cmd
    }

    /// Number of cached pids, including failed reads.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
