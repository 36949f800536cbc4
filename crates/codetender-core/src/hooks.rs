use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::{CodetenderError, IoResultExt, Result};

/// Runs a shell command in a directory and fails if it exits non-zero.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str, cwd: &Path) -> Result<()>;
}

/// Runs commands through the platform shell (`sh -c`, or `cmd /C` on
/// Windows).
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellCommandRunner;

impl CommandRunner for ShellCommandRunner {
    fn run(&self, command: &str, cwd: &Path) -> Result<()> {
        debug!("  Running command: {}", command);

        let mut shell = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C");
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c");
            c
        };
        let output = shell.arg(command).current_dir(cwd).output().at(cwd)?;

        if !output.status.success() {
            return Err(CodetenderError::HookCommand {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Runs `script` in `cwd` if one is configured. `stage` labels the log.
pub fn run_script(
    runner: &dyn CommandRunner,
    stage: &str,
    script: Option<&str>,
    cwd: &Path,
) -> Result<()> {
    match script {
        Some(script) => {
            debug!("Running {} script...", stage);
            runner.run(script, cwd)
        }
        None => Ok(()),
    }
}
