//! Getting a template onto disk: a local directory is copied, anything else
//! is treated as a git repository and cloned.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{CodetenderError, IoResultExt, Result};

const GITHUB_PREFIX: &str = "https://github.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Local(PathBuf),
    Git(String),
}

impl TemplateSource {
    /// An existing path is a local template. Otherwise `owner/repo` becomes
    /// `https://github.com/owner/repo.git`; URLs only get the `.git` suffix
    /// if it is missing.
    pub fn resolve(template: &str) -> Self {
        let path = Path::new(template);
        if path.exists() {
            return TemplateSource::Local(path.to_path_buf());
        }

        let mut url = template.to_string();
        if !url.starts_with("http") {
            url = format!("{}{}", GITHUB_PREFIX, url);
            debug!("Added https prefix to template: {}", url);
        }
        if !url.ends_with(".git") {
            url.push_str(".git");
            debug!("Added git extension to template: {}", url);
        }
        TemplateSource::Git(url)
    }

    pub fn acquire(&self, target: &Path) -> Result<()> {
        match self {
            TemplateSource::Local(from) => {
                info!(
                    "Copying from template {} into folder {}",
                    from.display(),
                    target.display()
                );
                copy_tree(from, target)
            }
            TemplateSource::Git(url) => {
                info!("Cloning from repo: {} into folder {}", url, target.display());
                git_clone(url, target)
            }
        }
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    debug!("  Creating folder: {}", to.display());
    fs::create_dir_all(to).at(to)?;

    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(|e| CodetenderError::Filesystem {
            path: e.path().unwrap_or(from).to_path_buf(),
            source: e.into(),
        })?;
        let relative = entry.path().strip_prefix(from).map_err(|e| {
            CodetenderError::Acquisition(format!("{}: {}", entry.path().display(), e))
        })?;
        let dest = to.join(relative);
        if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &dest)?;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).at(&dest)?;
        } else {
            fs::copy(entry.path(), &dest).at(entry.path())?;
        }
    }
    Ok(())
}

/// Links are recreated pointing at the same target, never dereferenced.
#[cfg(unix)]
fn copy_symlink(link: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(link).at(link)?;
    std::os::unix::fs::symlink(&target, dest).at(dest)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, _dest: &Path) -> Result<()> {
    debug!("  Skipping symlink: {}", link.display());
    Ok(())
}

fn git_clone(url: &str, target: &Path) -> Result<()> {
    let output = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(target)
        .output()
        .map_err(|e| CodetenderError::Acquisition(format!("could not run git: {}", e)))?;

    if !output.status.success() {
        return Err(CodetenderError::Acquisition(format!(
            "git clone {} exited with {}: {}",
            url,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}
