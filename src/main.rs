//! Interactive shell for minisql.

use std::{
    io::{self, BufReader},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use minisql::{
    shell::{Shell, ShellConfig},
    storage::persist::PersistFormat,
};
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "minisql")]
#[command(about = "A small in-memory SQL engine")]
struct Args {
    /// Directory tables are loaded from at start and saved to on exit.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Encoding of saved tables.
    #[arg(long, value_enum, default_value_t = PersistFormat::Json)]
    format: PersistFormat,

    /// Log filter, e.g. "debug" or "minisql=info". Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

/// Initialize tracing on stderr so it never mixes with query output.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let config = ShellConfig {
        data_dir: args.data_dir,
        format: args.format,
    };
    let result = Shell::new(config)
        .and_then(|mut shell| shell.run(BufReader::new(io::stdin()), io::stdout()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Failed to run SQL shell: {}", err);
            ExitCode::FAILURE
        }
    }
}
