use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tabledsl::codegen::FileSink;
use tabledsl::config::{resolve_data_source_name, GenerationOptions};
use tabledsl::introspect::Driver;

#[derive(Parser, Debug)]
#[command(name = "tabledsl")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Database driver: mysql, sqlite3 or postgres
    driver: String,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Data source name (default: DATABASE_URL)
    #[arg(short, long)]
    dsn: Option<String>,

    /// Comma-separated list of tables to generate (default: all)
    #[arg(short, long, value_delimiter = ',')]
    tables: Option<Vec<String>>,

    /// Comma-separated words whose casing is kept in identifiers, e.g. ID,HTML
    #[arg(long, value_delimiter = ',')]
    force_cases: Option<Vec<String>>,

    /// Path to .env file consulted when --dsn is absent
    #[arg(long, default_value = "./.env")]
    env_file: PathBuf,

    /// Ask before overwriting existing files
    #[arg(short, long)]
    interactive: bool,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        error!(error = ?e, "Fatal error");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("tabledsl v{}", env!("CARGO_PKG_VERSION"));

    // unknown drivers terminate before any connection attempt
    let driver: Driver = match cli.driver.parse() {
        Ok(driver) => driver,
        Err(e) => {
            error!(driver = ?cli.driver, "{}", e);
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let data_source_name = resolve_data_source_name(cli.dsn, &cli.env_file)
        .context("Failed to resolve data source")?;

    let options = GenerationOptions::new(data_source_name)
        .with_table_names(cli.tables.unwrap_or_default())
        .with_force_cases(cli.force_cases.unwrap_or_default())
        .with_force_overwrite(!cli.interactive);

    info!(
        driver = %driver,
        output = ?cli.output,
        connection = ?options.redacted_data_source_name(),
        "Starting code generation"
    );
    debug!(
        tables = ?options.table_names,
        force_cases = ?options.force_cases,
        "Generation options"
    );

    let mut sink = FileSink::new(cli.output);
    let report = tabledsl::generate(driver, &options, &mut sink)
        .with_context(|| format!("Failed to generate code from {}", options.redacted_data_source_name()))?;

    if report.tables.is_empty() {
        warn!(database = ?report.database_name, "No tables found");
    }
    for path in &report.skipped {
        info!(path = ?path, "Kept existing file");
    }
    info!(
        database = ?report.database_name,
        tables = report.tables.len(),
        written = report.written.len(),
        output = ?sink.output_dir(),
        "Done"
    );

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}
