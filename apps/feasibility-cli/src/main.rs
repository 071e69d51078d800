//! Parcel feasibility CLI
//!
//! Reads one parcel as JSON (from a file or stdin), runs every enabled
//! housing program against it, and prints the analysis report.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use entitlement_engine::{EngineConfig, ScenarioComposer};
use shared_types::ParcelContext;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "feasibility")]
#[command(version, about = "Housing entitlement feasibility for a single parcel")]
struct Args {
    /// Parcel JSON file; reads stdin when omitted or "-"
    parcel: Option<PathBuf>,

    /// Engine settings (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only run these programs (repeatable), e.g. --program sb9_duplex --program adu
    #[arg(short, long = "program")]
    programs: Vec<String>,

    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries only the report
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if !args.programs.is_empty() {
        config
            .restrict_to(&args.programs)
            .context("Invalid --program value")?;
    }

    let parcel = read_parcel(args.parcel.as_ref())?;
    tracing::info!(apn = %parcel.apn, zone = %parcel.zoning_code, "analyzing parcel");

    let report = ScenarioComposer::from_config(config).compose(&parcel);

    let output = match args.format {
        OutputFormat::Text => report.to_text(),
        OutputFormat::Json if args.pretty => serde_json::to_string_pretty(&report)?,
        OutputFormat::Json => serde_json::to_string(&report)?,
    };
    println!("{}", output);

    Ok(())
}

fn read_parcel(path: Option<&PathBuf>) -> Result<ParcelContext> {
    let (json, source) = match path.filter(|p| p.as_os_str() != "-") {
        Some(path) => (
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read parcel file: {}", path.display()))?,
            path.display().to_string(),
        ),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read parcel from stdin")?;
            (buf, "stdin".to_string())
        }
    };

    serde_json::from_str(&json).with_context(|| format!("Invalid parcel JSON from {}", source))
}
