//! One complete generation run.
//!
//! Routes are rendered first; only when every fragment exists are the prior
//! documents consulted, so the merge always works on whole files. The published
//! document, its baseline and the info fragment are written before the HTML site
//! and the machine-readable collections.

use crate::config::DocConfig;
use crate::markdown::{assemble, default_frontmatter, render_info, render_route, DocumentParts};
use crate::merge::{read_optional, MergeEngine, MergeOutcome, MergedRoute, PriorDocuments};
use crate::normalizer::{process_routes, RouteGroups};
use crate::openapi_builder::OpenApiBuilder;
use crate::postman::CollectionBuilder;
use crate::serializer::{copy_file, serialize_json, write_atomic};
use crate::site::{self, interactive_page, SiteGenerator, INTERACTIVE_FILE};
use crate::source::matcher::RouteMatcher;
use crate::source::RouteSource;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "index.md";
pub const BASELINE_FILE: &str = ".compare.md";
pub const INFO_FILE: &str = "info.md";
pub const PREPEND_FILE: &str = "prepend.md";
pub const APPEND_FILE: &str = "append.md";

/// What a run did, route by route
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Route id and merge outcome, in document order
    pub outcomes: Vec<(String, MergeOutcome)>,
    /// Every file written, in write order
    pub written: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn route_count(&self) -> usize {
        self.outcomes.len()
    }

    fn ids_with(&self, outcome: MergeOutcome) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == outcome)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Routes whose manual edits were kept
    pub fn preserved(&self) -> Vec<&str> {
        self.ids_with(MergeOutcome::Preserved)
    }

    /// Routes whose manual edits were overwritten
    pub fn discarded(&self) -> Vec<&str> {
        self.ids_with(MergeOutcome::Discarded)
    }
}

/// Runs the documentation pipeline for one configuration.
pub struct Generator<'c> {
    config: &'c DocConfig,
    force: bool,
    site: Box<dyn SiteGenerator>,
}

impl<'c> Generator<'c> {
    pub fn new(config: &'c DocConfig, force: bool) -> Self {
        Self {
            config,
            force,
            site: site::from_config(config),
        }
    }

    /// Replaces the site generator chosen from the configuration.
    pub fn with_site_generator(mut self, site: Box<dyn SiteGenerator>) -> Self {
        self.site = site;
        self
    }

    /// Lists, filters and normalizes the routes of `source`, then generates.
    pub fn run(&self, source: &dyn RouteSource) -> Result<GenerationReport> {
        let raw = source.list_routes().context("Failed to list routes")?;
        info!("Found {} routes", raw.len());

        let matcher = RouteMatcher::new(&self.config.routes)?;
        let matched = matcher.select(raw);
        debug!("{} routes matched the route rules", matched.len());

        let groups = process_routes(&matched, &self.config.default_group);
        self.generate(&groups)
    }

    /// Writes every artifact for already normalized routes.
    pub fn generate(&self, groups: &RouteGroups) -> Result<GenerationReport> {
        let config = self.config;
        let output = config.output.as_path();
        let source_dir = config.source_dir();
        let index_path = source_dir.join(INDEX_FILE);
        let baseline_path = source_dir.join(BASELINE_FILE);
        let mut report = GenerationReport::default();

        let rendered: Vec<(&str, Vec<String>)> = groups
            .iter()
            .map(|(group, routes)| {
                let fragments = routes.iter().map(|route| render_route(route, config)).collect();
                (group.as_str(), fragments)
            })
            .collect();

        let prior = PriorDocuments::load(&index_path, &baseline_path);
        let engine = MergeEngine::new(&prior, self.force);
        let merged: Vec<(&str, Vec<MergedRoute>)> = groups
            .iter()
            .zip(rendered)
            .map(|((_, routes), (group, fragments))| {
                let routes = routes
                    .iter()
                    .zip(fragments)
                    .map(|(route, output)| engine.merge_route(route, output))
                    .collect();
                (group, routes)
            })
            .collect();

        for (_, routes) in &merged {
            for route in routes {
                report.outcomes.push((route.route.id.clone(), route.outcome));
            }
        }

        let info_text = render_info(config);
        let parts = DocumentParts {
            frontmatter: engine.frontmatter(default_frontmatter(config)),
            info: info_text.clone(),
            prepend: read_optional(&source_dir.join(PREPEND_FILE)).unwrap_or_default(),
            append: read_optional(&source_dir.join(APPEND_FILE)).unwrap_or_default(),
        };

        let published = assemble(
            &parts,
            merged
                .iter()
                .map(|(group, routes)| (*group, routes.iter().map(MergedRoute::published_output))),
        );
        let baseline = assemble(
            &parts,
            merged
                .iter()
                .map(|(group, routes)| (*group, routes.iter().map(|r| r.output.as_str()))),
        );

        self.write(&mut report, &published, &index_path)?;
        self.write(&mut report, &baseline, &baseline_path)?;
        info!("Wrote index.md to: {}", output.display());

        info!("Generating API HTML code");
        self.site.generate(output, &published)?;
        info!("Wrote HTML documentation to: {}", output.join("index.html").display());

        self.write(&mut report, &info_text, &source_dir.join(INFO_FILE))?;

        if config.collections {
            self.write_collections(&mut report, groups)?;
        }

        if let Some(logo) = &config.logo {
            let target = output.join("images").join("logo.png");
            copy_file(logo, &target)
                .with_context(|| format!("Failed to copy logo {}", logo.display()))?;
            report.written.push(target);
        }

        Ok(report)
    }

    fn write_collections(&self, report: &mut GenerationReport, groups: &RouteGroups) -> Result<()> {
        let config = self.config;
        let output = config.output.as_path();

        info!("Generating Postman collection");
        let mut collection = CollectionBuilder::new(config);
        for (group, routes) in groups {
            collection.add_group(group, routes);
        }
        let collection = serialize_json(&collection.build())?;
        self.write(report, &collection, &output.join("collection.json"))?;

        info!("Generating OpenAPI 3.0.0 document");
        let mut openapi = OpenApiBuilder::new(config);
        for (group, routes) in groups {
            openapi.add_group(group, routes);
        }
        let openapi = serialize_json(&openapi.build())?;
        self.write(report, &openapi, &output.join("openapi.json"))?;

        let interactive = output.join(INTERACTIVE_FILE);
        self.write(report, &interactive_page(&config.title), &interactive)?;
        info!("Wrote an interactive HTML documentation to: {}", interactive.display());
        Ok(())
    }

    fn write(&self, report: &mut GenerationReport, content: &str, path: &Path) -> Result<()> {
        write_atomic(content, path)?;
        report.written.push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{HttpMethod, RouteRecord};
    use std::fs;
    use tempfile::TempDir;

    struct NoSite;

    impl SiteGenerator for NoSite {
        fn generate(&self, _output_dir: &Path, _markdown: &str) -> Result<()> {
            Ok(())
        }
    }

    fn config_in(dir: &Path) -> DocConfig {
        DocConfig {
            output: dir.to_path_buf(),
            ..Default::default()
        }
    }

    fn groups() -> RouteGroups {
        let mut groups = RouteGroups::new();
        groups.insert(
            "Users".to_string(),
            vec![
                RouteRecord::new("R1", "users", HttpMethod::Get),
                RouteRecord::new("R2", "users", HttpMethod::Post),
            ],
        );
        groups
    }

    #[test]
    fn test_generate_writes_all_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let report = Generator::new(&config, false).generate(&groups()).unwrap();

        for file in [
            "source/index.md",
            "source/.compare.md",
            "source/info.md",
            "index.html",
            "collection.json",
            "openapi.json",
            "interractive.html",
        ] {
            assert!(temp_dir.path().join(file).exists(), "missing {}", file);
        }
        assert_eq!(report.route_count(), 2);
        assert!(report.preserved().is_empty());
        assert_eq!(report.written.len(), 6);
    }

    #[test]
    fn test_collections_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let config = DocConfig {
            collections: false,
            ..config_in(temp_dir.path())
        };
        Generator::new(&config, false)
            .with_site_generator(Box::new(NoSite))
            .generate(&groups())
            .unwrap();

        assert!(temp_dir.path().join("source/index.md").exists());
        assert!(!temp_dir.path().join("collection.json").exists());
        assert!(!temp_dir.path().join("openapi.json").exists());
        assert!(!temp_dir.path().join("index.html").exists());
        let info = fs::read_to_string(temp_dir.path().join("source/info.md")).unwrap();
        assert!(!info.contains("Postman"));
    }

    #[test]
    fn test_prepend_and_append_are_included() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let source = temp_dir.path().join("source");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("prepend.md"), "# Welcome").unwrap();
        fs::write(source.join("append.md"), "# Errors").unwrap();

        Generator::new(&config, false)
            .with_site_generator(Box::new(NoSite))
            .generate(&groups())
            .unwrap();

        let index = fs::read_to_string(source.join("index.md")).unwrap();
        assert!(index.contains("<!-- END_INFO -->\n# Welcome\n\n# Users\n"));
        assert!(index.ends_with("<!-- END_R2 -->\n\n# Errors"));
    }

    #[test]
    fn test_missing_logo_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let config = DocConfig {
            logo: Some(temp_dir.path().join("missing.png")),
            ..config_in(temp_dir.path())
        };
        let result = Generator::new(&config, false)
            .with_site_generator(Box::new(NoSite))
            .generate(&groups());
        assert!(result.is_err());
    }
}
