use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod workflow;

use cli::{Command, RootArgs, DEFAULT_LOG_FILTER};

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    // stdout carries protocol output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.log_filter.as_deref());

    match args.command {
        Command::Run(args) => workflow::run_flow(args),
        Command::Validate(args) => workflow::run_validate(args),
        Command::Extract(args) => workflow::run_extract(args),
        Command::Config(args) => workflow::run_config(args),
    }
}
