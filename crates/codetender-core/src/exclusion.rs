//! Glob expansion over a tree root and the set of paths the walk must leave
//! alone.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{CONFIG_FILE, VCS_DIR};
use crate::{CodetenderError, Result};

/// A path on disk that one of the expanded patterns matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobMatch {
    pub path: PathBuf,
    pub is_dir: bool,
}

struct RootedGlob {
    matcher: GlobMatcher,
    dir_only: bool,
    /// For `dir/**`, matches `dir` itself.
    subtree_root: Option<GlobMatcher>,
}

fn compile(glob: &str, pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| CodetenderError::Configuration(format!("invalid glob '{}': {}", pattern, e)))
}

impl RootedGlob {
    fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.strip_prefix("./").unwrap_or(pattern);
        let dir_only = trimmed.ends_with('/');
        let trimmed = trimmed.trim_end_matches('/');
        let subtree_root = match trimmed.strip_suffix("/**") {
            Some(prefix) if !prefix.is_empty() => Some(compile(prefix, pattern)?),
            _ => None,
        };
        Ok(Self {
            matcher: compile(trimmed, pattern)?,
            dir_only,
            subtree_root,
        })
    }

    fn is_match(&self, relative: &str, is_dir: bool) -> bool {
        if is_dir {
            if let Some(root) = &self.subtree_root {
                if root.is_match(relative) {
                    return true;
                }
            }
        }
        (is_dir || !self.dir_only) && self.matcher.is_match(relative)
    }
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Expands `patterns` against the entries below `root`.
///
/// Patterns are relative to `root` and use `/` separators. `*` stays within
/// one path segment and `**` spans several; `*` also matches names starting
/// with a dot. A trailing `/` only matches directories, and `dir/**` matches
/// `dir` as well as everything below it. Matched directories are not
/// descended into. Symlinks are never followed and count as files.
pub fn expand<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Vec<GlobMatch>> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }
    let globs = patterns
        .iter()
        .map(|p| RootedGlob::new(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut matches = Vec::new();
    let mut entries = WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter();
    while let Some(entry) = entries.next() {
        let entry = entry.map_err(|e| CodetenderError::Filesystem {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;
        let is_dir = entry.file_type().is_dir();
        let relative = relative_slash_path(root, entry.path());
        if globs.iter().any(|g| g.is_match(&relative, is_dir)) {
            matches.push(GlobMatch {
                path: entry.path().to_path_buf(),
                is_dir,
            });
            if is_dir {
                entries.skip_current_dir();
            }
        }
    }
    Ok(matches)
}

/// Paths exempt from token replacement, resolved once before the walk.
#[derive(Debug, Default, Clone)]
pub struct ExclusionIndex {
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl ExclusionIndex {
    /// Expands `patterns` plus the baseline exclusions (`.git/` and
    /// `.codetender`) against `root`.
    pub fn build<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Self> {
        let mut all: Vec<&str> = patterns.iter().map(|p| p.as_ref()).collect();
        for baseline in [VCS_DIR, CONFIG_FILE] {
            if !all.contains(&baseline) {
                all.push(baseline);
            }
        }

        let mut index = Self::default();
        for found in expand(root, &all)? {
            debug!("  Skip path: {}", found.path.display());
            if found.is_dir {
                index.dirs.insert(found.path);
            } else {
                index.files.insert(found.path);
            }
        }
        Ok(index)
    }

    pub fn is_excluded_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// A directory in the index is neither processed, renamed nor descended
    /// into.
    pub fn is_excluded_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.is_excluded_file(path) || self.is_excluded_dir(path)
    }
}
