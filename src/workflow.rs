use crate::cli::{ConfigArgs, ExtractArgs, RunArgs, ValidateArgs};
use anyhow::{anyhow, Context, Result};
use ddp_flow::archive::ZipOpener;
use ddp_flow::config::{self, FlowConfig};
use ddp_flow::extract::Extraction;
use ddp_flow::flow::DonationFlow;
use ddp_flow::host;
use ddp_flow::platform::platform_by_id;
use ddp_flow::validate::ValidationResult;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn run_flow(args: RunArgs) -> Result<()> {
    let config = match args.config.as_deref() {
        Some(path) => config::load_config(path)?,
        None => FlowConfig::default(),
    };
    let session_id = match args.session_id {
        Some(id) => id,
        None => now_epoch_ms()?.to_string(),
    };
    let platforms = config::build_platforms(&config)?;
    let mut flow = DonationFlow::new(session_id, platforms, Box::new(ZipOpener))
        .with_file_extensions(config.file_extensions);
    let stdout = io::stdout().lock();
    let summary = match args.responses.as_deref() {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("open responses {}", path.display()))?;
            host::drive(&mut flow, BufReader::new(file), stdout)?
        }
        None => host::drive(&mut flow, io::stdin().lock(), stdout)?,
    };
    tracing::debug!(answers = summary.answers, "run complete");
    Ok(())
}

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let platform = platform_by_id(&args.platform)?;
    let handle = path_handle(&args.archive)?;
    let validation = platform.validator().validate_archive(&ZipOpener, handle);
    print_json(&validation.result, true)
}

#[derive(Serialize)]
struct ExtractReport<'a> {
    validation: &'a ValidationResult,
    #[serde(flatten)]
    extraction: &'a Extraction,
}

pub fn run_extract(args: ExtractArgs) -> Result<()> {
    let platform = platform_by_id(&args.platform)?;
    let handle = path_handle(&args.archive)?;
    let validation = platform.validator().validate_archive(&ZipOpener, handle);
    let archive = match validation.archive {
        Some(archive) if validation.result.is_recognized() => archive,
        _ => {
            return Err(anyhow!(
                "{} is not a recognized {} export (status {}: {})",
                args.archive.display(),
                platform.name(),
                validation.result.status().id,
                validation.result.status().description
            ))
        }
    };
    let extraction = platform.extract(archive.as_ref());
    print_json(
        &ExtractReport {
            validation: &validation.result,
            extraction: &extraction,
        },
        args.pretty,
    )
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.check {
        Some(path) => {
            let config = config::load_config(&path)?;
            print_json(&config, true)
        }
        None => {
            println!("{}", config::config_stub()?);
            Ok(())
        }
    }
}

fn path_handle(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("archive path is not valid UTF-8: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("serialize output")?;
    println!("{text}");
    Ok(())
}

fn now_epoch_ms() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("compute timestamp")?
        .as_millis())
}
