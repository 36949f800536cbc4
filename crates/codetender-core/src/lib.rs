use std::io;
use std::path::{Path, PathBuf};

pub mod cleanup;
pub mod config;
pub mod exclusion;
pub mod hooks;
pub mod pipeline;
pub mod source;
pub mod stats;
pub mod templater;
pub mod token;
pub mod walker;

pub use config::{Config, Scripts, TokenDef, CONFIG_FILE};
pub use exclusion::ExclusionIndex;
pub use hooks::{CommandRunner, ShellCommandRunner};
pub use pipeline::{Codetender, NoPrompt, RunOutcome, TokenResolver};
pub use source::TemplateSource;
pub use stats::{FileMatches, Rename, RunStats, StatsCollector, TokenReport};
pub use templater::{ContentReplacer, RenameOutcome, Renamer, ReplacementOutcome};
pub use token::{Token, TokenRegistry};
pub use walker::{TreeWalker, WalkSummary};

#[derive(thiserror::Error, Debug)]
pub enum CodetenderError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("I/O error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Command '{command}' failed with {status}: {stderr}")]
    HookCommand {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Template acquisition failed: {0}")]
    Acquisition(String),
}

pub type Result<T> = std::result::Result<T, CodetenderError>;

/// Attaches the offending path to an I/O failure.
pub(crate) trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| CodetenderError::Filesystem {
            path: path.to_path_buf(),
            source,
        })
    }
}
