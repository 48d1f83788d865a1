//! Waygen command line
//!
//! Generates typed client proxies from a protocol description:
//!
//! ```text
//! waygen /path/to/wayland.xml /path/to/wayland.hpp /path/to/wayland.cpp
//! ```

mod logging;

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use waygen_core::{Driver, GeneratorConfig};

#[derive(Debug, Parser)]
#[command(name = "waygen")]
#[command(about = "Generate typed client proxies from a protocol description")]
#[command(version)]
struct Cli {
    /// Protocol description (e.g. wayland.xml)
    input: PathBuf,

    /// Declarations output (e.g. wayland.hpp)
    declarations: PathBuf,

    /// Definitions output (e.g. wayland.cpp)
    definitions: PathBuf,
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let driver = Driver::new(GeneratorConfig::default());
    let summary = driver.run(&cli.input, &cli.declarations, &cli.definitions)?;
    info!(
        "Generated {} of {} interfaces ({} hand-maintained)",
        summary.emitted, summary.interfaces, summary.skipped
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            // Usage errors exit with 1, not clap's default of 2
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    logging::init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
