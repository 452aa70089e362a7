use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod admission;
mod config;

use admission::Report;
use config::{Cli, Command, Config, LogFormat, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.config);

    match cli.command {
        Command::Crd => print_crd(&cli.config),
        Command::Validate { files } => validate(&cli.config, &files).await,
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn print_crd(config: &Config) -> Result<()> {
    let crd = ibmvpc_api::crd()?;
    let rendered = match config.output_format {
        OutputFormat::Yaml => serde_yaml::to_string(&crd)?,
        OutputFormat::Json => serde_json::to_string_pretty(&crd)?,
    };
    println!("{rendered}");
    Ok(())
}

async fn validate(config: &Config, files: &[PathBuf]) -> Result<()> {
    let inventory = match &config.inventory {
        Some(path) => Some(admission::load_inventory(path).await?),
        None => None,
    };

    let mut report = Report::default();
    for file in files {
        admission::validate_file(file, config.strict_status, inventory.as_ref(), &mut report)
            .await?;
    }

    info!(
        accepted = report.accepted,
        rejected = report.rejected,
        "Validation finished"
    );
    if report.rejected > 0 {
        bail!("{} of {} manifests rejected", report.rejected, report.accepted + report.rejected);
    }
    Ok(())
}
