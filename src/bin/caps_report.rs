//! Inspect a capability descriptor from the command line.
//!
//! `report` prints the whole registry; `supports` and `check-abi` print a JSON
//! verdict and exit 0 when positive, 1 when negative, so shell scripts can gate
//! on them directly. Load and usage errors exit 2.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mediacaps::runtime::resolve_descriptor_path;
use mediacaps::{
    AbiVersion, CapabilityError, CapabilityRegistry, CapabilityReport, render_capability_matrix,
};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "caps-report", about = "Query a media library capability descriptor")]
struct Cli {
    /// Descriptor to load (defaults to MEDIACAPS_DESCRIPTOR, then the bundled one).
    #[arg(long, global = true)]
    descriptor: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every feature with versions and the deprecated-API flag.
    Report {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Check whether one feature is available and how it loads.
    Supports { name: String },
    /// Check whether a consumer built against VERSION (`current` or `c:r:a`) can run.
    CheckAbi { version: AbiVersion },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("caps-report: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("MEDIACAPS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<bool> {
    let path = match cli.descriptor {
        Some(path) => path,
        None => resolve_descriptor_path()?,
    };
    let registry = CapabilityRegistry::load(&path)
        .with_context(|| format!("loading descriptor {}", path.display()))?;

    match cli.command.unwrap_or(Command::Report {
        format: Format::Json,
    }) {
        Command::Report { format } => {
            print_report(&registry, format)?;
            Ok(true)
        }
        Command::Supports { name } => supports(&registry, &name),
        Command::CheckAbi { version } => {
            let compatible = registry.check_abi_compatibility(&version);
            let verdict = json!({
                "built_against": version.to_string(),
                "runtime": registry.abi().to_string(),
                "oldest_compatible_current": registry.abi().oldest_supported(),
                "compatible": compatible,
            });
            println!("{}", serde_json::to_string(&verdict)?);
            Ok(compatible)
        }
    }
}

fn print_report(registry: &CapabilityRegistry, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let report = CapabilityReport::from_registry(registry);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Text => {
            println!("release: {}", registry.release());
            println!("abi: {}", registry.abi());
            println!("deprecated api: {}", registry.is_deprecated_api_enabled());
            print!("{}", render_capability_matrix(registry)?);
        }
    }
    Ok(())
}

fn supports(registry: &CapabilityRegistry, name: &str) -> Result<bool> {
    let verdict = match registry.load_mode(name) {
        Ok(mode) => json!({
            "feature": name,
            "status": "enabled",
            "load_mode": mode,
            "library": registry.backing_library(name)?,
        }),
        Err(CapabilityError::Disabled(_)) => json!({"feature": name, "status": "disabled"}),
        Err(CapabilityError::Unknown(_)) => json!({"feature": name, "status": "unknown"}),
        Err(other) => return Err(other.into()),
    };
    println!("{}", serde_json::to_string(&verdict)?);
    Ok(registry.is_supported(name))
}
