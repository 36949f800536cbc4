mod cli;
mod prompt;
mod report;

use anyhow::Result;
use cli::{Cli, Commands};
use codetender_core::{Codetender, Config, RunOutcome, TokenDef};
use prompt::InteractiveResolver;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_logging(&cli)?;

    if !cli.quiet {
        report::splash();
    }

    let result = match cli.command {
        Commands::New {
            template,
            folder,
            file,
            tokens,
        } => handle_new_command(template, folder, file, tokens),
        Commands::Replace {
            folder,
            file,
            tokens,
        } => handle_replace_command(folder, file, tokens),
    };

    match result {
        Ok(outcome) => {
            if !cli.quiet {
                report::print_stats(&outcome.stats, cli.verbose);
                report::print_banner(&outcome.banner);
            }
            Ok(())
        }
        Err(err) => {
            if !cli.quiet {
                report::oops();
            }
            Err(err)
        }
    }
}

fn build_runner(file: Option<PathBuf>, tokens: Vec<TokenDef>) -> Codetender {
    let config = Config {
        tokens,
        ..Config::default()
    };
    let codetender = Codetender::new(config).with_resolver(Box::new(InteractiveResolver));
    match file {
        Some(file) => codetender.with_config_file(file),
        None => codetender,
    }
}

fn handle_new_command(
    template: String,
    folder: PathBuf,
    file: Option<PathBuf>,
    tokens: Vec<TokenDef>,
) -> Result<RunOutcome> {
    debug!("Command Line Arguments:");
    debug!("  Template: {}", template);
    debug!("  Folder: {:?}", folder);
    debug!("  Config file: {:?}", file);

    let outcome = build_runner(file, tokens).new_from_template(&template, &folder)?;

    info!(
        "Successfully served template \"{}\" into \"{}\".",
        template,
        outcome.target.display()
    );
    Ok(outcome)
}

fn handle_replace_command(
    folder: PathBuf,
    file: Option<PathBuf>,
    tokens: Vec<TokenDef>,
) -> Result<RunOutcome> {
    debug!("Command Line Arguments:");
    debug!("  Folder: {:?}", folder);
    debug!("  Config file: {:?}", file);

    let outcome = build_runner(file, tokens).replace(&folder)?;
    Ok(outcome)
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact()
        )
        .with(filter)
        .init();

    Ok(())
}
