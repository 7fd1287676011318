//! An in-memory filesystem for tests.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::{instrument, trace};

use super::{Filesystem, Mode};

/// A filesystem that lives entirely in memory.
///
/// Paths are compared component-wise, so iteration order matches the
/// lexicographic, depth first order of a sorted directory walk.
///
/// Failures can be injected per path with [`MemoryFilesystem::fail_reads`],
/// [`MemoryFilesystem::fail_writes`], and [`MemoryFilesystem::fail_walk`]
/// to exercise error handling that is hard to provoke on a real disk.
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    fail_reads: BTreeSet<PathBuf>,
    fail_writes: BTreeSet<PathBuf>,
    fail_walk: BTreeSet<PathBuf>,
}

#[derive(Clone, Debug)]
enum Node {
    Dir { mode: Mode },
    File { mode: Mode, content: Vec<u8> },
}

impl MemoryFilesystem {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future read of the path fail.
    pub fn fail_reads(&self, path: impl Into<PathBuf>) {
        self.state().fail_reads.insert(path.into());
    }

    /// Make every future write or directory creation at the path fail.
    pub fn fail_writes(&self, path: impl Into<PathBuf>) {
        self.state().fail_writes.insert(path.into());
    }

    /// Make any walk that reaches the path fail at that entry.
    pub fn fail_walk(&self, path: impl Into<PathBuf>) {
        self.state().fail_walk.insert(path.into());
    }

    /// The mode the entry at the path was created with, if it exists.
    pub fn mode_of(&self, path: &Path) -> Option<Mode> {
        self.state().nodes.get(path).map(|node| match node {
            Node::Dir { mode } | Node::File { mode, .. } => *mode,
        })
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn injected(path: &Path) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        format!("injected failure: {path:?}"),
    )
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.state().nodes.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.state().nodes.get(path), Some(Node::Dir { .. }))
    }

    #[instrument(name = "MemoryFilesystem::create_dir", skip(self))]
    fn create_dir(&self, path: &Path, mode: Mode) -> std::io::Result<()> {
        let mut state = self.state();
        if state.fail_writes.contains(path) {
            return Err(injected(path));
        }

        let mut ancestors = path.ancestors().collect::<Vec<_>>();
        ancestors.reverse();
        for dir in ancestors.into_iter().filter(|dir| !dir.as_os_str().is_empty()) {
            match state.nodes.get(dir) {
                Some(Node::Dir { .. }) => {}
                Some(Node::File { .. }) => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotADirectory,
                        format!("not a directory: {dir:?}"),
                    ));
                }
                None => {
                    state.nodes.insert(dir.to_path_buf(), Node::Dir { mode });
                    trace!(?dir, %mode, "create directory");
                }
            }
        }
        Ok(())
    }

    #[instrument(name = "MemoryFilesystem::walk", skip(self, visit))]
    fn walk(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(&Path, bool) -> std::io::Result<()>,
    ) -> std::io::Result<()> {
        // Snapshot the tree so `visit` is free to call back into the filesystem.
        let entries = {
            let state = self.state();
            if !state.nodes.contains_key(root) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("walk root not found: {root:?}"),
                ));
            }
            state
                .nodes
                .range(root.to_path_buf()..)
                .take_while(|(path, _)| path.starts_with(root))
                .map(|(path, node)| {
                    let is_dir = matches!(node, Node::Dir { .. });
                    let failed = state.fail_walk.contains(path);
                    (path.clone(), is_dir, failed)
                })
                .collect::<Vec<_>>()
        };

        for (path, is_dir, failed) in entries {
            if failed {
                return Err(injected(&path));
            }
            visit(&path, is_dir)?;
        }
        Ok(())
    }

    #[instrument(name = "MemoryFilesystem::read_file", skip(self))]
    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        let state = self.state();
        if state.fail_reads.contains(path) {
            return Err(injected(path));
        }
        match state.nodes.get(path) {
            Some(Node::File { content, .. }) => Ok(content.clone()),
            Some(Node::Dir { .. }) => Err(std::io::Error::new(
                std::io::ErrorKind::IsADirectory,
                format!("is a directory: {path:?}"),
            )),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {path:?}"),
            )),
        }
    }

    #[instrument(name = "MemoryFilesystem::write_file", skip(self, content))]
    fn write_file(&self, path: &Path, content: &[u8], mode: Mode) -> std::io::Result<()> {
        let mut state = self.state();
        if state.fail_writes.contains(path) {
            return Err(injected(path));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !matches!(state.nodes.get(parent), Some(Node::Dir { .. })) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("parent directory not found: {parent:?}"),
                ));
            }
        }

        // Like the OS, overwriting a file keeps its original mode.
        let mode = match state.nodes.get(path) {
            Some(Node::Dir { .. }) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::IsADirectory,
                    format!("is a directory: {path:?}"),
                ));
            }
            Some(Node::File { mode, .. }) => *mode,
            None => mode,
        };
        state.nodes.insert(
            path.to_path_buf(),
            Node::File {
                mode,
                content: content.to_vec(),
            },
        );
        trace!(?path, %mode, bytes = content.len(), "write file");
        Ok(())
    }
}
