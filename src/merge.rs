//! Change detection between generation runs.
//!
//! Three documents are involved: the fragment just rendered, the previously
//! *published* document (which people may have edited by hand) and the
//! *baseline*, i.e. what the generator produced last time. A route whose published
//! fragment differs from its baseline fragment was edited manually; its edit is
//! kept unless the run is forced.
//!
//! Comparison is plain text equality of the region between a route's markers.
//! Each route is decided on its own.

use crate::markdown::{end_marker, start_marker, INFO_START};
use crate::route::RouteRecord;
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::path::Path;

/// How the emitted fragment of a route was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No manual edit detected; the fresh fragment is emitted
    Fresh,
    /// A manual edit was found and kept
    Preserved,
    /// A manual edit was found and overwritten because the run was forced
    Discarded,
}

/// A fragment located in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// The whole match, markers included
    pub full: &'a str,
    /// Text between the markers
    pub inner: &'a str,
}

/// Finds the fragment of route `id` in `document`.
pub fn extract_fragment<'a>(document: &'a str, id: &str) -> Option<Fragment<'a>> {
    let pattern = format!(
        "(?s){}(.*?){}",
        regex::escape(&start_marker(id)),
        regex::escape(&end_marker(id))
    );
    let re = Regex::new(&pattern).ok()?;
    let captures = re.captures(document)?;
    Some(Fragment {
        full: captures.get(0)?.as_str(),
        inner: captures.get(1)?.as_str(),
    })
}

/// Frontmatter of a generated document, without the `---` fences.
pub fn extract_frontmatter(document: &str) -> Option<String> {
    let pattern = format!("(?s)---(.*)---\\s{}", regex::escape(INFO_START));
    let re = Regex::new(&pattern).ok()?;
    let captures = re.captures(document)?;
    let frontmatter = captures.get(1)?.as_str().trim_matches('\n');
    Some(frontmatter.to_string())
}

/// The documents written by the previous run, read in full.
#[derive(Debug, Clone, Default)]
pub struct PriorDocuments {
    /// The published document, possibly edited by hand
    pub published: Option<String>,
    /// The baseline generated last time
    pub baseline: Option<String>,
}

/// Reads a file that may legitimately be missing; unreadable counts as missing.
pub(crate) fn read_optional(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("Ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

impl PriorDocuments {
    pub fn new(published: Option<String>, baseline: Option<String>) -> Self {
        Self { published, baseline }
    }

    /// Reads both documents; missing or unreadable files count as absent.
    pub fn load(published_path: &Path, baseline_path: &Path) -> Self {
        Self {
            published: read_optional(published_path),
            baseline: read_optional(baseline_path),
        }
    }
}

/// A route with its fresh fragment and, when a manual edit was kept, the edited one.
#[derive(Debug, Clone)]
pub struct MergedRoute<'a> {
    pub route: &'a RouteRecord,
    /// The freshly rendered fragment, written to the baseline
    pub output: String,
    /// The published fragment kept instead of `output`
    pub modified_output: Option<String>,
    pub outcome: MergeOutcome,
}

impl MergedRoute<'_> {
    /// The fragment that goes into the published document
    pub fn published_output(&self) -> &str {
        self.modified_output.as_deref().unwrap_or(&self.output)
    }
}

/// Decides, route by route, between fresh output and manual edits.
pub struct MergeEngine<'a> {
    prior: &'a PriorDocuments,
    force: bool,
}

impl<'a> MergeEngine<'a> {
    pub fn new(prior: &'a PriorDocuments, force: bool) -> Self {
        Self { prior, force }
    }

    fn is_modified(&self, route: &RouteRecord) -> Option<Fragment<'a>> {
        let prior: &'a PriorDocuments = self.prior;
        let published = prior.published.as_deref()?;
        let existing = extract_fragment(published, &route.id)?;
        let baseline = prior
            .baseline
            .as_deref()
            .and_then(|doc| extract_fragment(doc, &route.id))?;

        (baseline.inner != existing.inner).then_some(existing)
    }

    /// Chooses the fragment to publish for `route`.
    pub fn merge_route<'r>(&self, route: &'r RouteRecord, output: String) -> MergedRoute<'r> {
        let (modified_output, outcome) = match self.is_modified(route) {
            None => (None, MergeOutcome::Fresh),
            Some(_) if self.force => {
                warn!(
                    "Discarded manual changes for route [{}] {}",
                    route.methods_label(),
                    route.uri
                );
                (None, MergeOutcome::Discarded)
            }
            Some(existing) => {
                warn!(
                    "Skipping modified route [{}] {}",
                    route.methods_label(),
                    route.uri
                );
                (Some(existing.full.to_string()), MergeOutcome::Preserved)
            }
        };
        debug!("Route {} merged as {:?}", route.id, outcome);

        MergedRoute {
            route,
            output,
            modified_output,
            outcome,
        }
    }

    /// The published document's frontmatter if it has one, else `fresh`.
    pub fn frontmatter(&self, fresh: String) -> String {
        self.prior
            .published
            .as_deref()
            .and_then(extract_frontmatter)
            .unwrap_or(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::HttpMethod;

    const BASELINE: &str = "---\ntitle: Old\n---\n<!-- START_INFO -->\n# Info\n<!-- END_INFO -->\n\
        <!-- START_R1 -->\n## One\n<!-- END_R1 -->\n\
        <!-- START_R5 -->\n## Five\n<!-- END_R5 -->\n";

    fn route(id: &str) -> RouteRecord {
        RouteRecord::new(id, "users", HttpMethod::Get)
    }

    #[test]
    fn test_extract_fragment() {
        let fragment = extract_fragment(BASELINE, "R5").unwrap();
        assert_eq!(fragment.inner, "\n## Five\n");
        assert_eq!(fragment.full, "<!-- START_R5 -->\n## Five\n<!-- END_R5 -->");
        assert!(extract_fragment(BASELINE, "R9").is_none());
        // ids are matched literally
        assert!(extract_fragment(BASELINE, "R.").is_none());
    }

    #[test]
    fn test_extract_fragment_missing_end_marker() {
        assert!(extract_fragment("<!-- START_R1 -->\n## One\n", "R1").is_none());
    }

    #[test]
    fn test_extract_frontmatter() {
        assert_eq!(extract_frontmatter(BASELINE).as_deref(), Some("title: Old"));
        assert!(extract_frontmatter("no frontmatter here").is_none());
    }

    #[test]
    fn test_no_published_document_is_fresh() {
        let prior = PriorDocuments::default();
        let engine = MergeEngine::new(&prior, false);
        let r5 = route("R5");
        let merged = engine.merge_route(&r5, "fresh".to_string());
        assert_eq!(merged.outcome, MergeOutcome::Fresh);
        assert_eq!(merged.published_output(), "fresh");
    }

    #[test]
    fn test_unmodified_route_is_regenerated() {
        let prior = PriorDocuments::new(Some(BASELINE.to_string()), Some(BASELINE.to_string()));
        let engine = MergeEngine::new(&prior, false);
        let r5 = route("R5");
        let merged = engine.merge_route(&r5, "fresh".to_string());
        assert_eq!(merged.outcome, MergeOutcome::Fresh);
        assert_eq!(merged.published_output(), "fresh");
    }

    #[test]
    fn test_modified_route_is_preserved() {
        let published = BASELINE.replace("## Five", "## Five, edited by hand");
        let prior = PriorDocuments::new(Some(published), Some(BASELINE.to_string()));
        let engine = MergeEngine::new(&prior, false);

        let r5 = route("R5");
        let five = engine.merge_route(&r5, "fresh".to_string());
        assert_eq!(five.outcome, MergeOutcome::Preserved);
        assert_eq!(
            five.published_output(),
            "<!-- START_R5 -->\n## Five, edited by hand\n<!-- END_R5 -->"
        );
        assert_eq!(five.output, "fresh");

        let r1 = route("R1");
        let one = engine.merge_route(&r1, "fresh one".to_string());
        assert_eq!(one.outcome, MergeOutcome::Fresh);
        assert_eq!(one.published_output(), "fresh one");
    }

    #[test]
    fn test_forced_run_discards_edits() {
        let published = BASELINE.replace("## Five", "## Five, edited by hand");
        let prior = PriorDocuments::new(Some(published), Some(BASELINE.to_string()));
        let engine = MergeEngine::new(&prior, true);

        let r5 = route("R5");
        let five = engine.merge_route(&r5, "fresh".to_string());
        assert_eq!(five.outcome, MergeOutcome::Discarded);
        assert_eq!(five.published_output(), "fresh");
    }

    #[test]
    fn test_missing_baseline_fragment_is_fresh() {
        let published = BASELINE.replace("## Five", "## Five, edited by hand");
        let prior = PriorDocuments::new(Some(published), Some("garbage".to_string()));
        let engine = MergeEngine::new(&prior, false);
        assert_eq!(
            engine.merge_route(&route("R5"), "fresh".to_string()).outcome,
            MergeOutcome::Fresh
        );
    }

    #[test]
    fn test_frontmatter_carry_over() {
        let prior = PriorDocuments::new(Some(BASELINE.to_string()), None);
        let engine = MergeEngine::new(&prior, false);
        assert_eq!(engine.frontmatter("title: New".to_string()), "title: Old");

        let empty = PriorDocuments::default();
        assert_eq!(
            MergeEngine::new(&empty, false).frontmatter("title: New".to_string()),
            "title: New"
        );
    }

    #[test]
    fn test_load_missing_files() {
        let prior = PriorDocuments::load(
            Path::new("/nonexistent/index.md"),
            Path::new("/nonexistent/.compare.md"),
        );
        assert!(prior.published.is_none());
        assert!(prior.baseline.is_none());
    }
}
