//! Generator configuration.
//!
//! A single [`DocConfig`] value is loaded once per run and handed to every
//! encoder, so no stage reads configuration on its own. Files may be YAML or
//! JSON; both are read through `serde_yaml`.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "idoc.yaml";

/// Which adapter supplies the raw routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterKind {
    /// Route manifests on disk (a file or a directory of files)
    #[default]
    Manifest,
    /// A command that prints the route table as JSON
    Command,
}

/// Route selection criteria of a [`RouteRule`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteMatch {
    pub domains: Vec<String>,
    pub prefixes: Vec<String>,
}

impl Default for RouteMatch {
    fn default() -> Self {
        Self {
            domains: vec!["*".to_string()],
            prefixes: vec!["*".to_string()],
        }
    }
}

/// Values merged into every route a rule selects
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteApply {
    pub headers: IndexMap<String, String>,
}

/// One inclusion rule of the `routes` section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteRule {
    #[serde(rename = "match")]
    pub matches: RouteMatch,
    /// Route names (or uris) always included
    pub include: Vec<String>,
    /// Route names (or uris) never included by the match criteria
    pub exclude: Vec<String>,
    pub apply: RouteApply,
}

/// Configuration of a documentation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DocConfig {
    pub router: RouterKind,
    /// Manifest file or directory for [`RouterKind::Manifest`]
    pub source: String,
    /// Program and arguments for [`RouterKind::Command`]
    pub source_command: Vec<String>,
    pub routes: Vec<RouteRule>,
    pub output: PathBuf,
    /// Emit the Postman collection, OpenAPI document and interactive viewer
    pub collections: bool,
    pub title: String,
    pub description: String,
    pub version: String,
    pub logo: Option<PathBuf>,
    /// Ordered language key -> display name; drives every code sample
    #[serde(alias = "language_tabs")]
    pub language_tabs: IndexMap<String, String>,
    #[serde(alias = "app_url")]
    pub app_url: String,
    pub default_group: String,
    /// Group whose routes also become named component schemas
    pub schema_group: String,
    /// External static-site generator, run inside the output directory
    pub site_command: Option<Vec<String>>,
}

impl Default for DocConfig {
    fn default() -> Self {
        let mut language_tabs = IndexMap::new();
        language_tabs.insert("bash".to_string(), "Bash".to_string());
        language_tabs.insert("javascript".to_string(), "Javascript".to_string());

        Self {
            router: RouterKind::Manifest,
            source: "routes".to_string(),
            source_command: Vec::new(),
            routes: vec![RouteRule::default()],
            output: PathBuf::from("public/docs"),
            collections: true,
            title: "API Reference".to_string(),
            description: String::new(),
            version: "1.0.0".to_string(),
            logo: None,
            language_tabs,
            app_url: "http://localhost".to_string(),
            default_group: "general".to_string(),
            schema_group: "Payment processors".to_string(),
            site_command: None,
        }
    }
}

impl DocConfig {
    /// Loads a configuration file, YAML or JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_str_at(&content, path)
    }

    fn from_str_at(content: &str, path: &Path) -> Result<Self> {
        let mut config: DocConfig = serde_yaml::from_str(content).map_err(|e| Error::ConfigError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if config.routes.is_empty() {
            config.routes.push(RouteRule::default());
        }
        Ok(config)
    }

    /// Directory holding the Markdown sources
    pub fn source_dir(&self) -> PathBuf {
        self.output.join("source")
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.app_url.trim_end_matches('/')
    }
}
