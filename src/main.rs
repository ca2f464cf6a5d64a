//! docstr-swagger - command-line tool generating API documentation from handler docstrings.
//!
//! # Usage
//!
//! ```bash
//! docstr-swagger [OPTIONS] <ROUTES_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation for the `urls` route module:
//! ```bash
//! docstr-swagger ./routes -o api.yaml
//! ```
//!
//! Document a single top-level API as JSON, leaving out the admin namespace:
//! ```bash
//! docstr-swagger ./routes -m project.urls -x admin -p accounts -f json
//! ```

use anyhow::Result;
use clap::Parser;
use docstr_swagger::cli;
use log::info;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("docstr-swagger starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
