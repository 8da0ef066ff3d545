//! idoc-gen - command-line tool for generating API documentation.
//!
//! Reads the application's route table, renders it to Markdown and HTML, and
//! optionally writes a Postman collection and an OpenAPI 3.0 document. Manual
//! edits to the generated Markdown survive regeneration unless `--force` is given.
//!
//! # Usage
//!
//! ```bash
//! idoc-gen [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Generate with `./idoc.yaml`:
//! ```bash
//! idoc-gen
//! ```
//!
//! Use another configuration and output directory:
//! ```bash
//! idoc-gen -c docs/idoc.yaml -o public/api-docs
//! ```
//!
//! Discard manual edits:
//! ```bash
//! idoc-gen --force -v
//! ```

use anyhow::Result;
use clap::Parser;
use idoc_gen::cli;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("idoc-gen starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
