//! Swagger From Source - Command-line tool for documenting Express APIs in place.
//!
//! This binary scans Express module directories, asks a Gemini model to describe every
//! route and writes a Swagger JSDoc block above each route registration it can find.
//!
//! # Usage
//!
//! ```bash
//! swagger-from-source [OPTIONS] <MODULE_DIR>...
//! ```
//!
//! # Examples
//!
//! Document two modules, with the router aggregation file named explicitly:
//! ```bash
//! GEMINI_API_KEY=... swagger-from-source src/modules/users src/modules/orders \
//!     --router-context src/routes/index.js
//! ```
//!
//! Write a JSON run report and enable verbose logging:
//! ```bash
//! swagger-from-source src/modules/users -r report.json -f json -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swagger_from_source::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let parsed = cli::CliArgs::parse();

    let log_level = if parsed.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Swagger From Source starting...");

    let args = cli::parse_args_from_parsed(parsed)?;

    cli::run(args)?;

    info!("Swagger documentation generation completed successfully");

    Ok(())
}
