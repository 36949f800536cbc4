use std::ffi::OsString;
use std::fs;
use std::io;
use std::ops::Add;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::exclusion::ExclusionIndex;
use crate::templater::{ContentReplacer, Renamer};
use crate::token::TokenRegistry;
use crate::{IoResultExt, Result};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    pub directories_visited: usize,
    pub files_processed: usize,
    pub content_changes: usize,
    pub paths_renamed: usize,
}

impl Add for WalkSummary {
    type Output = WalkSummary;

    fn add(self, other: WalkSummary) -> WalkSummary {
        WalkSummary {
            directories_visited: self.directories_visited + other.directories_visited,
            files_processed: self.files_processed + other.files_processed,
            content_changes: self.content_changes + other.content_changes,
            paths_renamed: self.paths_renamed + other.paths_renamed,
        }
    }
}

/// Walks a tree post-order, replacing file contents on the way down and
/// renaming each directory's entries once everything below them is done.
///
/// Siblings are processed concurrently on the rayon pool. A directory's
/// renames wait for all of its children, so a rename never invalidates a
/// path that is still being worked on. Symlinks are never followed: a link
/// keeps its target's contents untouched but its own name is still subject
/// to renaming. The first error stops new sibling
/// work from being scheduled and is returned; work already completed stays
/// on disk.
pub struct TreeWalker<'a> {
    registry: &'a TokenRegistry,
    exclusions: &'a ExclusionIndex,
}

impl<'a> TreeWalker<'a> {
    pub fn new(registry: &'a TokenRegistry, exclusions: &'a ExclusionIndex) -> Self {
        Self {
            registry,
            exclusions,
        }
    }

    pub fn run(&self, root: &Path) -> Result<WalkSummary> {
        info!("Renaming files and replacing tokens where found...");

        let summary = self.process_directory(root)?;

        debug!(
            "Walk complete: {} directories, {} files processed, {} content changes, {} paths renamed",
            summary.directories_visited,
            summary.files_processed,
            summary.content_changes,
            summary.paths_renamed
        );
        Ok(summary)
    }

    fn process_directory(&self, dir: &Path) -> Result<WalkSummary> {
        debug!("Processing directory: {}", dir.display());

        let mut names = fs::read_dir(dir)
            .at(dir)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<Vec<OsString>>>()
            .at(dir)?;
        names.sort();

        // Children first, under their original names.
        let mut summary = names
            .par_iter()
            .map(|name| self.process_item(&dir.join(name)))
            .try_reduce(WalkSummary::default, |a, b| Ok(a + b))?;
        summary.directories_visited += 1;

        // Then this level's renames, once nothing below is pending.
        let renamer = Renamer::new(self.registry, self.exclusions);
        summary.paths_renamed += names
            .par_iter()
            .map(|name| match name.to_str() {
                Some(name) => renamer.process(dir, name).map(|o| o.is_renamed() as usize),
                None => {
                    debug!("Skipping non UTF-8 name in {}", dir.display());
                    Ok(0)
                }
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))?;

        Ok(summary)
    }

    fn process_item(&self, path: &Path) -> Result<WalkSummary> {
        if self.exclusions.is_excluded_dir(path) {
            debug!("Skipping folder tagged as noReplace: {}", path.display());
            return Ok(WalkSummary::default());
        }

        let file_type = fs::symlink_metadata(path).at(path)?.file_type();
        if file_type.is_symlink() {
            debug!("Not following symlink: {}", path.display());
            return Ok(WalkSummary::default());
        }
        if file_type.is_dir() {
            return self.process_directory(path);
        }
        if self.exclusions.is_excluded_file(path) {
            debug!("Skipping item marked for noReplace: {}", path.display());
            return Ok(WalkSummary::default());
        }

        let outcome = ContentReplacer::new(self.registry, self.exclusions).process(path)?;
        Ok(WalkSummary {
            files_processed: 1,
            content_changes: outcome.changed as usize,
            ..WalkSummary::default()
        })
    }
}
