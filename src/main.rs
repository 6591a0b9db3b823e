// LogGather - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading
// 3. Logging initialisation (debug mode support)
// 4. Dispatch to the gather or mask pipeline

use loggather::app;
use loggather::core::model::OutputFormat;
use loggather::platform;
use loggather::util;
use loggather::util::error::{LogGatherError, Result};

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// LogGather - Gather data points from many hosts' logs into org-mode tables.
///
/// Every top-level directory under the root is one source. Each source's logs
/// are searched with the regex rules of a criteria file and the results are
/// laid out as one column per source.
#[derive(Parser, Debug)]
#[command(name = "loggather", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Configuration file (defaults to the platform config directory).
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Gather data from every source's logs and write the report.
    Gather {
        /// Root directory; each top-level directory is one source.
        #[arg(short = 'p', long = "path", default_value = ".")]
        path: PathBuf,

        /// Criteria file (.json, or .toml by extension).
        #[arg(
            short = 'j',
            long = "criteria",
            visible_alias = "json",
            default_value = util::constants::DEFAULT_CRITERIA_FILE
        )]
        criteria: PathBuf,

        /// Output file (defaults to the configured file name inside the root).
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Output format (overrides the configured format).
        #[arg(short = 'f', long = "format", value_parser = ["org", "csv", "json"])]
        format: Option<String>,
    },

    /// Replace public IP addresses in every file with the given name.
    Mask {
        /// File name to look for (exact match, e.g. "messages").
        file: String,

        /// Root directory to search.
        #[arg(short = 'p', long = "path", default_value = ".")]
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // An explicit --config must load; the default location may be absent or broken.
    let (config_path, loaded) = match &cli.config {
        Some(path) => (path.clone(), platform::config::read_config(path)),
        None => {
            let path = platform::config::PlatformPaths::resolve().config_file();
            let loaded = platform::config::load_config(&path);
            (path, Ok(loaded))
        }
    };
    let (config, config_warnings) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => fail(&LogGatherError::from(e)),
    };

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "LogGather starting"
    );

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    let result = match cli.command {
        Command::Gather {
            path,
            criteria,
            output,
            format,
        } => gather(&path, &criteria, output, format.as_deref(), &config),
        Command::Mask { file, path } => mask(&path, &file, &config),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "LogGather failed");
        fail(&e);
    }
}

/// Print the full error chain and exit with status 1.
fn fail(err: &LogGatherError) -> ! {
    eprintln!("Error: {}", util::error::error_chain(err));
    std::process::exit(1);
}

fn gather(
    root: &Path,
    criteria_path: &Path,
    output: Option<PathBuf>,
    format: Option<&str>,
    config: &platform::config::AppConfig,
) -> Result<()> {
    let criteria = app::criteria_loader::load_criteria_file(criteria_path)?;

    let discovery_config = app::gather::discovery_config(config);
    let report = app::gather::run_gather(root, &criteria, &discovery_config)?;

    for warning in &report.warnings {
        tracing::warn!(warning = %warning, "Gathering warning");
    }

    // Both names were validated upstream; the fallback only guards a future
    // format missing from OutputFormat.
    let format_name = format.unwrap_or(&config.output_format);
    let format = OutputFormat::from_name(format_name).unwrap_or_default();

    let output_path = output.unwrap_or_else(|| root.join(&config.output_file_name));
    let content = app::gather::render_report(&report.gathering, &criteria, format, &output_path)?;
    app::gather::write_report(&output_path, &content)?;

    println!(
        "Gathered {} datum(s) from {} log(s) across {} source(s) into {} ({format})",
        report.gathering.datum_count(),
        report.logs_read,
        report.gathering.sources().len(),
        output_path.display(),
    );
    Ok(())
}

fn mask(
    root: &Path,
    file_name: &str,
    config: &platform::config::AppConfig,
) -> Result<()> {
    let discovery_config = app::gather::discovery_config(config);
    let report = app::mask::run_mask(root, file_name, &discovery_config)?;

    for warning in &report.warnings {
        tracing::warn!(warning = %warning, "Masking warning");
    }

    for path in &report.rewritten {
        println!("Masked {}", path.display());
    }
    println!(
        "{} file(s) masked, {} already clean",
        report.rewritten.len(),
        report.unchanged
    );
    Ok(())
}
