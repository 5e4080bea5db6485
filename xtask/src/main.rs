use std::env;
use std::fs;
use std::process;

use anyhow::Result;
use clap::{ArgMatches, Command};

const BIN_NAME: &str = "uclone";

fn main() -> Result<()> {
    let args = clap::command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("install").about("Install uclone binary locally"))
        .subcommand(
            Command::new("run")
                .about("Build and run uclone with arguments")
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .arg(clap::Arg::new("args")
                    .help("Arguments to pass to uclone")
                    .action(clap::ArgAction::Append)
                    .num_args(0..))
        )
        .subcommand(
            Command::new("test")
                .about("Test Operations")
                .subcommand(Command::new("all").about("Run all tests for the entire project"))
                .subcommand(Command::new("core").about("Run tests for uclone-core"))
                .subcommand(Command::new("bin").about("Run tests for uclone-bin"))
                .subcommand(Command::new("integration").about("Run the built binary against a scratch project"))
        )
        .get_matches();

    match args.subcommand() {
        Some(("install", _args)) => cargo(&["install", "--path", "crates/uclone-bin"], "install uclone"),
        Some(("run", args)) => handle_run_command(args),
        Some(("test", args)) => handle_test_commands(args),
        Some((command, _)) => anyhow::bail!("Unexpected command: {command}"),
        None => anyhow::bail!("Expected subcommand"),
    }
}

fn cargo(args: &[&str], what: &str) -> Result<()> {
    let status = process::Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("Failed to {what}");
    }
    Ok(())
}

fn handle_run_command(args: &ArgMatches) -> Result<()> {
    let run_args: Vec<&str> = args
        .get_many::<String>("args")
        .map_or(Vec::new(), |vals| vals.map(String::as_str).collect());

    let mut cargo_args = vec!["run", "--bin", BIN_NAME, "--"];
    cargo_args.extend(run_args);
    cargo(&cargo_args, "run uclone")
}

fn handle_test_commands(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("all", _args)) => test_all(),
        Some(("core", _args)) => cargo(&["test", "--package", "uclone-core"], "run core tests"),
        Some(("bin", _args)) => cargo(&["test", "--package", "uclone-bin"], "run binary tests"),
        Some(("integration", _args)) => test_integration(),
        _ => {
            println!("Available test commands:");
            println!("  all          - Run all tests for the entire project");
            println!("  core         - Run tests for uclone-core");
            println!("  bin          - Run tests for uclone-bin");
            println!("  integration  - Run the built binary against a scratch project");
            Ok(())
        }
    }
}

fn test_all() -> Result<()> {
    let suites: [(&str, fn() -> Result<()>); 3] = [
        ("workspace", || cargo(&["test", "--workspace"], "run workspace tests")),
        ("documentation", || cargo(&["test", "--doc", "--package", "uclone-core"], "run doc tests")),
        ("integration", test_integration),
    ];

    let mut failed = Vec::new();
    for (name, suite) in suites {
        println!("🧪 Running {name} tests...");
        match suite() {
            Ok(()) => println!("✅ {name} tests passed\n"),
            Err(err) => {
                println!("❌ {name} tests failed: {err}\n");
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

fn test_integration() -> Result<()> {
    cargo(&["build", "--bin", BIN_NAME], "build uclone binary")?;
    cargo(&["run", "--bin", BIN_NAME, "--", "--help"], "run uclone --help")?;

    let scratch = env::temp_dir().join("uclone-xtask");
    let source = scratch.join("Sample");
    let target = scratch.join("Renamed");
    fs::create_dir_all(source.join("Config"))?;
    fs::write(source.join("Config/DefaultGame.ini"), "ProjectName=Sample\n")?;

    let source = source.to_string_lossy();
    let target = target.to_string_lossy();
    cargo(
        &[
            "run", "--bin", BIN_NAME, "--",
            "--source-dir", &source,
            "--source-name", "Sample",
            "--target-dir", &target,
            "--target-name", "Renamed",
            "--force-delete",
        ],
        "clone the scratch project",
    )?;

    let cloned = fs::read_to_string(scratch.join("Renamed/Config/DefaultGame.ini"))?;
    if cloned != "ProjectName=Renamed\n" {
        anyhow::bail!("Unexpected clone contents: {cloned:?}");
    }

    fs::remove_dir_all(&scratch)?;
    Ok(())
}
