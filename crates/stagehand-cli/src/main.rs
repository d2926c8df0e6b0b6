//! Stagehand CLI - call editor tools from the terminal
//!
//! Every subcommand runs against an in-process document that starts with the
//! sample content (or empty with `--empty`) and is discarded on exit.

mod repl;
mod workspace;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::workspace::Workspace;

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Call Stagehand editor tools from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Start from an empty document instead of the sample content
    #[arg(long, global = true)]
    empty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single action and print the response envelope
    Call {
        /// Tool name, e.g. manage_data_table or data_table
        tool: String,

        /// Action name, e.g. add_rows
        action: String,

        /// Parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,
    },

    /// Run a file of requests, one JSON object per line
    Run {
        /// Request file; each line is {"tool": ..., "Action": ..., "ParamsJson": ...}
        file: PathBuf,

        /// Stop at the first failed request
        #[arg(long)]
        stop_on_error: bool,
    },

    /// List tools and their actions
    Actions {
        /// Only list this tool
        tool: Option<String>,
    },

    /// Interactive REPL
    Repl,
}

fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_env("STAGEHAND_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let mut workspace = Workspace::new(cli.empty)?;

    match cli.command {
        Commands::Call {
            tool,
            action,
            params,
        } => run_call(&mut workspace, &tool, &action, &params),
        Commands::Run {
            file,
            stop_on_error,
        } => run_file(&mut workspace, &file, stop_on_error),
        Commands::Actions { tool } => {
            print!("{}", workspace::describe_tools(workspace.registry(), tool.as_deref())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Repl => {
            repl::run_repl(workspace)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_call(workspace: &mut Workspace, tool: &str, action: &str, params: &str) -> Result<ExitCode> {
    let envelope = workspace::envelope(action, params)?;
    let response = workspace.call(tool, &envelope);
    println!("{}", response.to_json_pretty());
    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_file(workspace: &mut Workspace, path: &Path, stop_on_error: bool) -> Result<ExitCode> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut total = 0usize;
    let mut failed = 0usize;

    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let (tool, envelope) = match workspace::parse_script_line(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}:{line_no}: {e:#}", path.display());
                failed += 1;
                total += 1;
                if stop_on_error {
                    break;
                }
                continue;
            }
        };

        total += 1;
        let response = workspace.call(&tool, &envelope);
        tracing::debug!(line = line_no, tool = %tool, success = response.success, "Request finished");
        println!("{}", response.to_value());

        if !response.success {
            failed += 1;
            if stop_on_error {
                break;
            }
        }
    }

    eprintln!("{} requests, {} failed", total, failed);
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_parses_call() {
        let cli = Cli::try_parse_from([
            "stagehand",
            "--empty",
            "call",
            "data_table",
            "create",
            "--params",
            r#"{"TablePath": "/Game/Data/DT_New", "RowStruct": "/Script/Game.ItemRow"}"#,
        ])
        .unwrap_or_else(|e| panic!("arguments should parse: {e}"));
        assert!(cli.empty);
        assert!(matches!(cli.command, Commands::Call { ref action, .. } if action == "create"));
    }

    #[test]
    fn test_run_file_counts_failures() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("temp file: {e}"));
        let script = [
            "# add a row then read it back",
            r#"{"tool": "manage_data_table", "Action": "add_row", "ParamsJson": {"TablePath": "/Game/Data/DT_Items", "RowName": "Bow"}}"#,
            r#"{"tool": "data_table", "Action": "get_row", "ParamsJson": {"TablePath": "/Game/Data/DT_Items", "RowName": "Bow"}}"#,
            r#"{"tool": "data_table", "Action": "get_row", "ParamsJson": {"TablePath": "/Game/Data/DT_Items", "RowName": "Axe"}}"#,
        ];
        writeln!(file, "{}", script.join("\n")).unwrap_or_else(|e| panic!("write: {e}"));

        let mut workspace = Workspace::new(false).unwrap_or_else(|e| panic!("workspace: {e}"));
        let code = run_file(&mut workspace, file.path(), false).unwrap_or_else(|e| panic!("run: {e}"));
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(workspace.document().committed_count(), 2);
    }

    #[test]
    fn test_run_file_stops_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("temp file: {e}"));
        let script = [
            r#"{"tool": "level_actors", "Action": "remove", "ParamsJson": {"ActorName": "Ghost"}}"#,
            r#"{"tool": "level_actors", "Action": "remove", "ParamsJson": {"ActorName": "Sun"}}"#,
        ];
        writeln!(file, "{}", script.join("\n")).unwrap_or_else(|e| panic!("write: {e}"));

        let mut workspace = Workspace::new(false).unwrap_or_else(|e| panic!("workspace: {e}"));
        let code = run_file(&mut workspace, file.path(), true).unwrap_or_else(|e| panic!("run: {e}"));
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(workspace.document().actors().len(), 3);
    }
}
