use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scanxml::config::Config;
use scanxml::error::ReportError;
use scanxml::store::ScanDump;

#[derive(Parser)]
#[command(
    name = "scanxml",
    about = "Render web security scan results as an XML report",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON scan dump into the XML report
    Render {
        /// Scan dump (scan info, transactions, findings) as JSON
        dump: PathBuf,

        /// Config file path
        #[arg(long, short = 'c', default_value = "scanxml.toml")]
        config: PathBuf,

        /// Report path, overriding output_file from the config
        #[arg(long, short = 'o', env = "SCANXML_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Generate a starter scanxml.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            dump,
            config,
            output,
        } => cmd_render(dump, config, output),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn cmd_render(
    dump_path: PathBuf,
    config_path: PathBuf,
    output_path: Option<PathBuf>,
) -> Result<i32, ReportError> {
    let mut config = Config::load(&config_path)?;
    if let Some(out) = output_path {
        config.output.output_file = out;
    }

    // Fail on a bad destination before reading the dump.
    config.output.validate()?;

    let dump = ScanDump::load(&dump_path)?;
    tracing::info!(
        findings = dump.findings.len(),
        transactions = dump.transactions.len(),
        "loaded scan dump"
    );

    let summary = scanxml::write_report(dump, &config.output)?;
    println!(
        "Wrote {} finding(s) to {}",
        summary.total_findings,
        config.output.output_file.display()
    );

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, ReportError> {
    let path = PathBuf::from("scanxml.toml");

    if path.exists() && !force {
        eprintln!("scanxml.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created scanxml.toml");

    Ok(0)
}
