use std::process;

use anyhow::Result;
use clap::{ArgMatches, Command};

const BIN: &str = "codetender";

fn main() -> Result<()> {
    let args = clap::command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("install").about("Install codetender binary locally"))
        .subcommand(
            Command::new("run")
                .about("Build and run codetender with arguments")
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .arg(clap::Arg::new("args")
                    .help("Arguments to pass to codetender")
                    .action(clap::ArgAction::Append)
                    .num_args(0..))
        )
        .subcommand(
            Command::new("test")
                .about("Test Operations")
                .subcommand(Command::new("all").about("Run every test step for the workspace"))
                .subcommand(Command::new("core").about("Run tests for codetender-core"))
                .subcommand(Command::new("bin").about("Run tests for codetender-bin"))
                .subcommand(Command::new("cli").about("Smoke test the built binary's help output"))
        )
        .get_matches();

    match args.subcommand() {
        Some(("install", args)) => handle_install_command(args),
        Some(("run", args)) => handle_run_command(args),
        Some(("test", args)) => handle_test_commands(args),
        Some((command, _)) => anyhow::bail!("Unexpected command: {command}"),
        None => anyhow::bail!("Expected subcommand"),
    }
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = process::Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {} failed", args.join(" "));
    }
    Ok(())
}

fn handle_install_command(_args: &ArgMatches) -> Result<()> {
    println!("Installing {BIN}...");
    cargo(&["install", "--path", "crates/codetender-bin"])?;
    println!("✓ {BIN} installed successfully");
    Ok(())
}

fn handle_run_command(args: &ArgMatches) -> Result<()> {
    let run_args: Vec<&str> = args
        .get_many::<String>("args")
        .map_or(Vec::new(), |vals| vals.map(String::as_str).collect());

    let mut command = vec!["run", "--bin", BIN, "--"];
    command.extend(run_args);
    cargo(&command)
}

fn handle_test_commands(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("all", _args)) => test_all(),
        Some(("core", _args)) => cargo(&["test", "--package", "codetender-core"]),
        Some(("bin", _args)) => cargo(&["test", "--package", "codetender-bin"]),
        Some(("cli", _args)) => test_cli(),
        _ => {
            println!("Available test commands:");
            println!("  all   - Run every test step for the workspace");
            println!("  core  - Run tests for codetender-core");
            println!("  bin   - Run tests for codetender-bin");
            println!("  cli   - Smoke test the built binary's help output");
            Ok(())
        }
    }
}

fn test_all() -> Result<()> {
    let steps: [(&str, fn() -> Result<()>); 4] = [
        ("codetender-core tests", || cargo(&["test", "--package", "codetender-core"])),
        ("codetender-bin tests", || cargo(&["test", "--package", "codetender-bin"])),
        ("documentation tests", || cargo(&["test", "--doc", "--package", "codetender-core"])),
        ("CLI smoke tests", test_cli),
    ];

    let mut failed = Vec::new();
    for (name, step) in steps {
        println!("🧪 Running {name}...");
        match step() {
            Ok(()) => println!("✅ {name} passed\n"),
            Err(e) => {
                println!("❌ {name} failed: {e}\n");
                failed.push(name);
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("Test suite failed: {}", failed.join(", "));
    }
    println!("🎉 All tests passed successfully!");
    Ok(())
}

fn test_cli() -> Result<()> {
    cargo(&["build", "--bin", BIN])?;
    let invocations: [&[&str]; 4] = [
        &["--help"],
        &["new", "--help"],
        &["replace", "--help"],
        &["--version"],
    ];
    for invocation in invocations {
        let mut command = vec!["run", "--quiet", "--bin", BIN, "--"];
        command.extend_from_slice(invocation);
        cargo(&command)?;
    }
    Ok(())
}
