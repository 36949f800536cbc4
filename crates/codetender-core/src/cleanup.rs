use std::fs;
use std::path::Path;

use tracing::debug;

use crate::exclusion::expand;
use crate::{IoResultExt, Result};

/// Removes every file or directory under `root` matching `patterns`.
/// `kind` only labels the log output ("ignore", "delete").
pub fn remove_matching<S: AsRef<str>>(root: &Path, patterns: &[S], kind: &str) -> Result<usize> {
    if patterns.is_empty() {
        debug!("No files or folders matching {} config.", kind);
        return Ok(0);
    }

    debug!("Removing files matching {} config...", kind);
    let matches = expand(root, patterns)?;
    for found in &matches {
        debug!("  Removing: {}", found.path.display());
        if found.is_dir {
            fs::remove_dir_all(&found.path).at(&found.path)?;
        } else {
            fs::remove_file(&found.path).at(&found.path)?;
        }
    }
    Ok(matches.len())
}
