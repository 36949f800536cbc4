//! The `new` and `replace` flows, from acquisition to statistics.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cleanup::remove_matching;
use crate::config::{Config, TokenDef, CONFIG_FILE};
use crate::exclusion::ExclusionIndex;
use crate::hooks::{run_script, CommandRunner, ShellCommandRunner};
use crate::source::TemplateSource;
use crate::stats::{RunStats, StatsCollector};
use crate::token::TokenRegistry;
use crate::walker::TreeWalker;
use crate::{CodetenderError, IoResultExt, Result};

/// Completes the token list before substitution starts, typically by asking
/// the user.
pub trait TokenResolver {
    fn resolve(&self, tokens: &mut Vec<TokenDef>) -> Result<()>;
}

/// Leaves tokens as configured. Any token still lacking a replacement makes
/// the registry build fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl TokenResolver for NoPrompt {
    fn resolve(&self, _tokens: &mut Vec<TokenDef>) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub target: PathBuf,
    pub stats: RunStats,
    pub banner: Vec<String>,
}

pub struct Codetender {
    config: Config,
    config_file: Option<PathBuf>,
    runner: Box<dyn CommandRunner>,
    resolver: Box<dyn TokenResolver>,
}

impl Codetender {
    /// `config` holds values given directly by the caller; they override
    /// everything read from files.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            config_file: None,
            runner: Box::new(ShellCommandRunner),
            resolver: Box::new(NoPrompt),
        }
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_resolver(mut self, resolver: Box<dyn TokenResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Copies or clones `template` into the new folder `folder`, then
    /// replaces tokens there.
    pub fn new_from_template(&self, template: &str, folder: &Path) -> Result<RunOutcome> {
        let target = std::path::absolute(folder).at(folder)?;
        if target.exists() {
            return Err(CodetenderError::Configuration(format!(
                "Folder {} already exists. Please specify a valid name for a new folder or use \"codetender replace\" to replace tokens in existing files.",
                folder.display()
            )));
        }

        info!("Serving up code...");
        TemplateSource::resolve(template).acquire(&target)?;

        let template_config = Config::load_optional(&target.join(CONFIG_FILE))?.unwrap_or_default();
        let config = self.merged(template_config)?;

        remove_matching(&target, &config.delete, "delete")?;
        remove_matching(&target, &config.ignore, "ignore")?;

        self.substitute(target, config)
    }

    /// Replaces tokens in an existing folder. `ignore` patterns are not
    /// applied here.
    pub fn replace(&self, folder: &Path) -> Result<RunOutcome> {
        let target = std::path::absolute(folder).at(folder)?;
        if !target.is_dir() {
            return Err(CodetenderError::Configuration(format!(
                "Folder {} does not exist. Please specify a valid folder or use \"codetender new\" to copy and process a template.",
                folder.display()
            )));
        }

        info!("Replacing in place...");
        let config = self.merged(Config::default())?;

        remove_matching(&target, &config.delete, "delete")?;

        self.substitute(target, config)
    }

    fn merged(&self, template_config: Config) -> Result<Config> {
        let mut config = Config::default().merge(template_config);
        if let Some(path) = &self.config_file {
            config = config.merge(Config::load(path)?);
        }
        Ok(config.merge(self.config.clone()).with_baseline())
    }

    fn substitute(&self, target: PathBuf, mut config: Config) -> Result<RunOutcome> {
        self.resolver.resolve(&mut config.tokens)?;

        let registry = TokenRegistry::build(&config.tokens)?;
        let exclusions = ExclusionIndex::build(&target, &config.no_replace)?;

        run_script(
            self.runner.as_ref(),
            "before",
            config.scripts.before.as_deref(),
            &target,
        )?;
        let summary = if registry.is_empty() {
            info!("No tokens specified.");
            Default::default()
        } else {
            TreeWalker::new(&registry, &exclusions).run(&target)?
        };
        run_script(
            self.runner.as_ref(),
            "after",
            config.scripts.after.as_deref(),
            &target,
        )?;

        let stats = StatsCollector::new(&registry).collect(&summary);
        Ok(RunOutcome {
            target,
            stats,
            banner: config.banner,
        })
    }
}
