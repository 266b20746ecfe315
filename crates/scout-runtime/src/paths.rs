//! Search path assembly and the shared search-path state.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::debug;

/// Environment variable seeding [`SearchPathState::from_env`] (colon-delimited).
pub const SEARCH_PATH_VAR: &str = "PLUGSCOUT_PATH";

/// Ordered, deduplicated directories scanned in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPathSet {
    dirs: Vec<PathBuf>,
}

impl SearchPathSet {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut unique: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            let dir = dir.into();
            if !unique.contains(&dir) {
                unique.push(dir);
            }
        }
        Self { dirs: unique }
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.dirs.iter()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Colon-joined form, as stored in [`SEARCH_PATH_VAR`].
    pub fn joined(&self) -> String {
        join_paths(&self.dirs)
    }
}

impl<'a> IntoIterator for &'a SearchPathSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.dirs.iter()
    }
}

/// Shared search-path list that outlives a single run.
///
/// Every run that assembles a non-empty set replaces the contents, so later
/// runs (and loaders handed the same state) see earlier directories. Runs
/// sharing one handle must not overlap: the last write wins.
#[derive(Debug, Clone, Default)]
pub struct SearchPathState {
    dirs: Arc<RwLock<Vec<PathBuf>>>,
}

impl SearchPathState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: Arc::new(RwLock::new(dirs.into_iter().map(Into::into).collect())),
        }
    }

    /// Seed from [`SEARCH_PATH_VAR`]; an unset variable yields an empty state.
    pub fn from_env() -> Self {
        match std::env::var(SEARCH_PATH_VAR) {
            Ok(value) => Self::with_dirs(split_paths(&value)),
            Err(_) => Self::new(),
        }
    }

    pub fn snapshot(&self) -> Vec<PathBuf> {
        match self.dirs.read() {
            Ok(dirs) => dirs.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace(&self, set: &SearchPathSet) {
        let mut dirs = match self.dirs.write() {
            Ok(dirs) => dirs,
            Err(poisoned) => poisoned.into_inner(),
        };
        *dirs = set.as_slice().to_vec();
    }

    pub fn joined(&self) -> String {
        join_paths(&self.snapshot())
    }
}

fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn join_paths(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(":")
}

/// Inputs to one path assembly.
#[derive(Debug, Clone, Copy)]
pub struct PathInputs<'a> {
    pub search_paths: &'a [PathBuf],
    pub extra_paths: &'a [PathBuf],
    pub discover_cwd: bool,
    pub cwd: &'a Path,
    pub modules_dir: &'a str,
}

/// Build the run's search path set and persist it into `state`.
///
/// With no configured paths, no extra paths and cwd discovery off, the result
/// is empty and `state` is left alone.
pub fn assemble_paths(inputs: PathInputs<'_>, state: &SearchPathState) -> SearchPathSet {
    if inputs.search_paths.is_empty() && inputs.extra_paths.is_empty() && !inputs.discover_cwd {
        return SearchPathSet::default();
    }

    let mut dirs = state.snapshot();

    if inputs.discover_cwd {
        dirs.push(inputs.cwd.join(inputs.modules_dir));
    }

    // relative entries resolve against the run's cwd
    dirs.extend(inputs.search_paths.iter().map(|dir| inputs.cwd.join(dir)));
    dirs.extend(inputs.extra_paths.iter().map(|dir| inputs.cwd.join(dir)));

    let set = SearchPathSet::new(dirs);
    state.replace(&set);
    debug!(paths = %set.joined(), "Assembled plugin search paths");

    set
}
