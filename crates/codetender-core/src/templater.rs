use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::exclusion::ExclusionIndex;
use crate::token::TokenRegistry;
use crate::{IoResultExt, Result};

/// Result of running the registry over one file's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementOutcome {
    /// Occurrences replaced per token, in registry order. Empty when the file
    /// was skipped.
    pub counts: Vec<usize>,
    pub changed: bool,
}

impl ReplacementOutcome {
    pub fn unchanged() -> Self {
        Self::default()
    }
}

/// Result of running the registry over one path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Unchanged,
    Renamed {
        from: PathBuf,
        to: PathBuf,
        /// Indices of the tokens that matched the old name.
        tokens: Vec<usize>,
    },
}

impl RenameOutcome {
    pub fn is_renamed(&self) -> bool {
        matches!(self, RenameOutcome::Renamed { .. })
    }
}

pub struct ContentReplacer<'a> {
    registry: &'a TokenRegistry,
    exclusions: &'a ExclusionIndex,
}

impl<'a> ContentReplacer<'a> {
    pub fn new(registry: &'a TokenRegistry, exclusions: &'a ExclusionIndex) -> Self {
        Self {
            registry,
            exclusions,
        }
    }

    /// Replaces tokens in the file at `file_path`, writing it back only when
    /// its text actually changed.
    pub fn process(&self, file_path: &Path) -> Result<ReplacementOutcome> {
        if self.exclusions.is_excluded_file(file_path) {
            debug!("Skipping item marked for noReplace: {}", file_path.display());
            return Ok(ReplacementOutcome::unchanged());
        }

        let bytes = fs::read(file_path).at(file_path)?;
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(_) => {
                debug!("Skipping binary file: {}", file_path.display());
                return Ok(ReplacementOutcome::unchanged());
            }
        };

        debug!("Replacing tokens in: {}", file_path.display());
        let (new_content, counts) = self.registry.apply(&content);
        let changed = new_content != content;
        if changed {
            fs::write(file_path, new_content).at(file_path)?;
            for (token, &count) in self.registry.tokens().iter().zip(&counts) {
                token.record_file(file_path, count);
            }
        }

        Ok(ReplacementOutcome { counts, changed })
    }
}

pub struct Renamer<'a> {
    registry: &'a TokenRegistry,
    exclusions: &'a ExclusionIndex,
}

impl<'a> Renamer<'a> {
    pub fn new(registry: &'a TokenRegistry, exclusions: &'a ExclusionIndex) -> Self {
        Self {
            registry,
            exclusions,
        }
    }

    /// Applies the registry to `item_name` alone and renames
    /// `parent_dir/item_name` if the name changes.
    ///
    /// Two items that end up with the same name overwrite each other the way
    /// the platform's rename does; nothing detects it.
    pub fn process(&self, parent_dir: &Path, item_name: &str) -> Result<RenameOutcome> {
        let old_path = parent_dir.join(item_name);
        if self.exclusions.is_excluded(&old_path) {
            debug!("Skipping item marked for noReplace: {}", old_path.display());
            return Ok(RenameOutcome::Unchanged);
        }

        let (new_name, counts) = self.registry.apply(item_name);
        if new_name == item_name {
            return Ok(RenameOutcome::Unchanged);
        }

        let new_path = parent_dir.join(&new_name);
        debug!(
            "Renaming {} to {}",
            old_path.display(),
            new_path.display()
        );
        fs::rename(&old_path, &new_path).at(&old_path)?;

        let mut fired = Vec::new();
        for (i, (token, &count)) in self.registry.tokens().iter().zip(&counts).enumerate() {
            if count > 0 {
                token.record_rename(item_name, &new_name);
                fired.push(i);
            }
        }

        Ok(RenameOutcome::Renamed {
            from: old_path,
            to: new_path,
            tokens: fired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenDef;
    use tempfile::TempDir;

    fn registry(pairs: &[(&str, &str)]) -> TokenRegistry {
        let defs: Vec<_> = pairs.iter().map(|(p, r)| TokenDef::new(*p, *r)).collect();
        TokenRegistry::build(&defs).unwrap()
    }

    #[test]
    fn test_content_replacement() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("readme.md");
        fs::write(&file, "# This is a sample CodeTender template.").unwrap();
        let registry = registry(&[("CodeTender", "Served")]);
        let exclusions = ExclusionIndex::default();

        let outcome = ContentReplacer::new(&registry, &exclusions).process(&file).unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.counts, vec![1]);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "# This is a sample Served template."
        );
        let stats = registry.tokens()[0].stats();
        assert_eq!(stats.match_count, 1);
        assert_eq!(stats.matched_files[0].path, file);
    }

    #[test]
    fn test_unchanged_file_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("other.txt");
        fs::write(&file, "nothing here").unwrap();
        let before = fs::metadata(&file).unwrap().modified().unwrap();
        let registry = registry(&[("foo", "bar")]);
        let exclusions = ExclusionIndex::default();

        let outcome = ContentReplacer::new(&registry, &exclusions).process(&file).unwrap();

        assert!(!outcome.changed);
        assert_eq!(fs::metadata(&file).unwrap().modified().unwrap(), before);
        assert!(registry.tokens()[0].stats().matched_files.is_empty());
    }

    #[test]
    fn test_net_noop_substitution_is_not_written() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("swap.txt");
        fs::write(&file, "foo").unwrap();
        let registry = registry(&[("foo", "bar"), ("bar", "foo")]);
        let exclusions = ExclusionIndex::default();

        let outcome = ContentReplacer::new(&registry, &exclusions).process(&file).unwrap();

        assert!(!outcome.changed);
        assert_eq!(registry.tokens()[0].stats().match_count, 0);
    }

    #[test]
    fn test_binary_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("image.bin");
        fs::write(&file, [0xff, 0xfe, b'f', b'o', b'o']).unwrap();
        let registry = registry(&[("foo", "bar")]);
        let exclusions = ExclusionIndex::default();

        let outcome = ContentReplacer::new(&registry, &exclusions).process(&file).unwrap();

        assert_eq!(outcome, ReplacementOutcome::unchanged());
        assert_eq!(fs::read(&file).unwrap(), vec![0xff, 0xfe, b'f', b'o', b'o']);
    }

    #[test]
    fn test_excluded_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("no-replace-file.txt"), "foo").unwrap();
        let exclusions = ExclusionIndex::build(dir.path(), &["no-replace-file.txt"]).unwrap();
        let registry = registry(&[("foo", "bar")]);
        let file = dir.path().join("no-replace-file.txt");

        let replaced = ContentReplacer::new(&registry, &exclusions).process(&file).unwrap();
        let renamed = Renamer::new(&registry, &exclusions)
            .process(dir.path(), "no-replace-file.txt")
            .unwrap();

        assert!(!replaced.changed);
        assert_eq!(renamed, RenameOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&file).unwrap(), "foo");
    }

    #[test]
    fn test_missing_file_is_filesystem_error() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&[("foo", "bar")]);
        let exclusions = ExclusionIndex::default();

        let result = ContentReplacer::new(&registry, &exclusions).process(&dir.path().join("gone"));

        assert!(matches!(result, Err(crate::CodetenderError::Filesystem { .. })));
    }

    #[test]
    fn test_rename_composes_tokens_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo-sub.txt"), "").unwrap();
        let registry = registry(&[("foo", "bar"), ("sub", "folder")]);
        let exclusions = ExclusionIndex::default();

        let outcome = Renamer::new(&registry, &exclusions)
            .process(dir.path(), "foo-sub.txt")
            .unwrap();

        assert_eq!(
            outcome,
            RenameOutcome::Renamed {
                from: dir.path().join("foo-sub.txt"),
                to: dir.path().join("bar-folder.txt"),
                tokens: vec![0, 1],
            }
        );
        assert!(dir.path().join("bar-folder.txt").is_file());
        for token in registry.tokens() {
            let renamed = token.stats().renamed_paths;
            assert_eq!(renamed.len(), 1);
            assert_eq!(renamed[0].old, "foo-sub.txt");
            assert_eq!(renamed[0].new, "bar-folder.txt");
        }
    }

    #[test]
    fn test_rename_with_no_net_change_credits_nobody() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo.txt"), "").unwrap();
        let registry = registry(&[("foo", "tmp"), ("tmp", "foo")]);
        let exclusions = ExclusionIndex::default();

        let outcome = Renamer::new(&registry, &exclusions)
            .process(dir.path(), "foo.txt")
            .unwrap();

        assert!(!outcome.is_renamed());
        assert!(dir.path().join("foo.txt").is_file());
        assert!(registry.tokens()[0].stats().renamed_paths.is_empty());
    }
}
