use clap::{Parser, Subcommand};
use codetender_core::TokenDef;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codetender")]
#[command(version)]
#[command(about = "Create projects from templates by replacing tokens")]
#[command(long_about = "Copies a template (a local folder or a git repository) into a new folder, then replaces user-defined tokens in file and folder names and in file contents.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Display verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Do not output to console (overrides --verbose)")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Copies contents of template to new folder then prompts for token replacement")]
    New {
        #[arg(help = "Local template folder, git URL, or GitHub owner/repo")]
        template: String,

        #[arg(help = "Folder to create")]
        folder: PathBuf,

        #[arg(short, long, help = "Config file to read tokens and options from")]
        file: Option<PathBuf>,

        #[arg(short = 't', long = "token", value_parser = parse_token, help = "Token to replace, as PATTERN=REPLACEMENT")]
        tokens: Vec<TokenDef>,
    },

    #[command(about = "Prompts for token replacement and replaces tokens")]
    Replace {
        #[arg(help = "Existing folder to process")]
        folder: PathBuf,

        #[arg(short, long, help = "Config file to read tokens and options from")]
        file: Option<PathBuf>,

        #[arg(short = 't', long = "token", value_parser = parse_token, help = "Token to replace, as PATTERN=REPLACEMENT")]
        tokens: Vec<TokenDef>,
    },
}

/// Splits `PATTERN=REPLACEMENT` at the first `=`.
pub fn parse_token(value: &str) -> Result<TokenDef, String> {
    match value.split_once('=') {
        Some((pattern, _)) if pattern.is_empty() => Err("token pattern must not be empty".to_string()),
        Some((pattern, replacement)) => Ok(TokenDef::new(pattern, replacement)),
        None => Err(format!("expected PATTERN=REPLACEMENT, got '{}'", value)),
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
