use super::{RawRoute, RouteSource};
use crate::scanner::FileScanner;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads routes from manifest files.
///
/// The path may point at a single manifest or at a directory, in which case every
/// manifest below it is read in sorted path order. A manifest holds either a list of
/// routes or an object with a `routes` list.
pub struct ManifestRouteSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Manifest {
    List(Vec<RawRoute>),
    Wrapped { routes: Vec<RawRoute> },
}

impl ManifestRouteSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parses one manifest file.
    pub fn read_manifest(path: &Path) -> Result<Vec<RawRoute>> {
        debug!("Reading route manifest: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let manifest: Manifest = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON manifest: {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML manifest: {}", path.display()))?
        };

        Ok(match manifest {
            Manifest::List(routes) => routes,
            Manifest::Wrapped { routes } => routes,
        })
    }
}

impl RouteSource for ManifestRouteSource {
    fn list_routes(&self) -> Result<Vec<RawRoute>> {
        if self.path.is_file() {
            return Self::read_manifest(&self.path);
        }

        let scan_result = FileScanner::new(self.path.clone())
            .scan()
            .with_context(|| format!("Failed to scan route manifests in {}", self.path.display()))?;
        if scan_result.manifest_files.is_empty() {
            warn!("No route manifests found in {}", self.path.display());
        }

        let mut routes = Vec::new();
        for file in &scan_result.manifest_files {
            routes.extend(Self::read_manifest(file)?);
        }
        debug!(
            "Read {} routes from {} manifests",
            routes.len(),
            scan_result.manifest_files.len()
        );
        Ok(routes)
    }
}
