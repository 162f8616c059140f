//! CLI argument parsing for the donation flow tools.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Filter used when neither `--log-filter` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "ddp_flow=info";

/// Root CLI entrypoint for ddflow.
#[derive(Parser, Debug)]
#[command(
    name = "ddflow",
    version,
    about = "Step-wise data donation flow for platform exports",
    after_help = "Commands:\n  run [--responses <file>]     Drive the flow over JSON lines (stdin/stdout)\n  validate <archive>           Print the validation result for an export\n  extract <archive>            Print the tables extracted from an export\n  config                       Print the default config\n\nExamples:\n  ddflow run --session-id s1 < answers.jsonl\n  ddflow validate ~/Downloads/tiktok.zip\n  ddflow extract ~/Downloads/tiktok.zip --pretty",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Tracing filter directives (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level ddflow commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunArgs),
    Validate(ValidateArgs),
    Extract(ExtractArgs),
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Drive a donation flow over JSON lines")]
pub struct RunArgs {
    /// Flow config JSON (defaults apply when omitted)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Session id used to namespace donation keys (defaults to epoch millis)
    #[arg(long, value_name = "ID")]
    pub session_id: Option<String>,

    /// Read payloads from this JSON-lines file instead of stdin
    #[arg(long, value_name = "PATH")]
    pub responses: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Validate an export archive against a platform")]
pub struct ValidateArgs {
    /// Export archive (zip)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Platform id
    #[arg(long, default_value = "tiktok")]
    pub platform: String,
}

#[derive(Parser, Debug)]
#[command(about = "Extract the tables of a recognized export archive")]
pub struct ExtractArgs {
    /// Export archive (zip)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Platform id
    #[arg(long, default_value = "tiktok")]
    pub platform: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Print the default flow config")]
pub struct ConfigArgs {
    /// Load and validate this config instead of printing the default
    #[arg(long, value_name = "PATH")]
    pub check: Option<PathBuf>,
}
