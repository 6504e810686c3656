//! `mksql` - build the ares SQLite database from annotated CSV sources
//!
//! ```text
//! mksql                              # data/*.csv -> ares.sqlite
//! mksql -d out.sqlite --data-dir csv # explicit locations
//! mksql -c mksql.toml -v             # table list from a config file, debug logs
//! ```

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use comfy_table::{Table, presets::UTF8_FULL};
use mksql_core::identifier_column;
use mksql_interchange::{LoadConfig, LoadReport, build_database};

use crate::logging::{LogFormat, LoggingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "mksql",
    version,
    about = "Load annotated CSV files into a fresh SQLite database"
)]
struct Cli {
    /// Destination database file; any existing file is replaced
    #[arg(short, long, env = "MKSQL_DATABASE")]
    database: Option<PathBuf>,

    /// Directory holding `<table>.csv` sources
    #[arg(long, env = "MKSQL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// TOML file with the table order, source paths and views
    #[arg(short, long, env = "MKSQL_CONFIG")]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Increase log verbosity (-v debug, -vv trace with row dumps)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Do not print the summary table
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Defaults, then the config file, then command-line flags
    fn load_config(&self) -> anyhow::Result<LoadConfig> {
        let mut config = match &self.config {
            Some(path) => LoadConfig::from_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => LoadConfig::default(),
        };
        if let Some(database) = &self.database {
            config = config.with_database(database);
        }
        if let Some(data_dir) = &self.data_dir {
            config = config.with_data_dir(data_dir);
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = LoggingConfig::default()
        .with_format(cli.log_format)
        .with_verbosity(cli.verbose);
    if let Err(e) = logging::init(logging) {
        eprintln!("warning: failed to initialize logging: {e:#}");
    }

    match run(&cli) {
        Ok(report) => {
            if !cli.quiet {
                println!("{}", summary_table(&report));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "load failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<LoadReport> {
    let config = cli.load_config()?;
    tracing::info!(
        database = %config.database.display(),
        data_dir = %config.data_dir.display(),
        tables = config.tables.len(),
        "building database"
    );
    build_database(&config)
        .with_context(|| format!("failed to build {}", config.database.display()))
}

fn summary_table(report: &LoadReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["table", "rows", "skipped", "directives", "synthetic id"]);
    for t in &report.tables {
        table.add_row(vec![
            t.table.clone(),
            t.rows_inserted.to_string(),
            t.rows_skipped.to_string(),
            t.directives_applied.to_string(),
            if t.synthetic_id {
                identifier_column(&t.table)
            } else {
                String::new()
            },
        ]);
    }
    for view in &report.views {
        table.add_row(vec![
            view.clone(),
            "view".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ]);
    }
    table
}
