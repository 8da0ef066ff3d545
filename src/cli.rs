use crate::config::{DocConfig, DEFAULT_CONFIG_FILE};
use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Generate API documentation (Markdown, HTML, Postman and OpenAPI) from a route table
#[derive(Parser, Debug)]
#[command(name = "idoc-gen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file (YAML or JSON); defaults to ./idoc.yaml when present
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Output directory, overrides the `output` setting
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_path: Option<PathBuf>,

    /// Overwrite manually edited routes instead of keeping them
    #[arg(long = "force")]
    pub force: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if let Some(ref config_path) = args.config_path {
        if !config_path.is_file() {
            anyhow::bail!("Config file does not exist: {}", config_path.display());
        }
        info!("Config file: {}", config_path.display());
    }
    if let Some(ref output) = args.output_path {
        info!("Output directory: {}", output.display());
    }
    if args.force {
        info!("Forced run: manual changes will be discarded");
    }

    Ok(args)
}

/// Loads the configuration named on the command line, or the default file when it exists.
pub fn load_config(args: &CliArgs) -> Result<DocConfig> {
    let mut config = match &args.config_path {
        Some(path) => DocConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            DocConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => {
            warn!("No {} found, using default settings", DEFAULT_CONFIG_FILE);
            DocConfig::default()
        }
    };

    if let Some(output) = &args.output_path {
        config.output = output.clone();
    }
    Ok(config)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::pipeline::Generator;
    use crate::source;

    info!("Starting documentation generation...");
    let config = load_config(&args)?;
    debug!("Configuration: {:?}", config);

    let route_source = source::from_config(&config);
    let report = Generator::new(&config, args.force).run(route_source.as_ref())?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Routes documented: {}", report.route_count());
    info!("  - Manual edits kept: {}", report.preserved().len());
    info!("  - Manual edits discarded: {}", report.discarded().len());
    info!("  - Files written: {}", report.written.len());
    info!("  - Output: {}", config.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_flags() {
        let args = parse(&["idoc-gen", "-c", "docs.yaml", "-o", "out", "--force", "-v"]);
        assert_eq!(args.config_path, Some(PathBuf::from("docs.yaml")));
        assert_eq!(args.output_path, Some(PathBuf::from("out")));
        assert!(args.force);
        assert!(args.verbose);

        let defaults = parse(&["idoc-gen"]);
        assert!(defaults.config_path.is_none());
        assert!(!defaults.force);
    }

    #[test]
    fn test_missing_config_file_is_rejected() {
        let args = parse(&["idoc-gen", "--config", "/nonexistent/idoc.yaml"]);
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_output_flag_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("idoc.yaml");
        std::fs::write(&config_path, "output: from-config\ntitle: Shop\n").unwrap();

        let args = CliArgs {
            config_path: Some(config_path),
            output_path: Some(PathBuf::from("from-flag")),
            force: false,
            verbose: false,
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.title, "Shop");
        assert_eq!(config.output, PathBuf::from("from-flag"));
    }
}
