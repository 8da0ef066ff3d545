//! HTML output.
//!
//! Turning the Markdown into a site is delegated to a [`SiteGenerator`]. The
//! built-in [`ShellSiteGenerator`] writes a single `index.html` that renders the
//! embedded Markdown in the browser; [`CommandSiteGenerator`] runs an external
//! static-site generator instead.

use crate::config::DocConfig;
use crate::serializer::write_atomic;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::process::Command;

/// File name of the interactive OpenAPI viewer
pub const INTERACTIVE_FILE: &str = "interractive.html";

/// Produces the HTML site for a generated Markdown document
pub trait SiteGenerator {
    /// Builds the site into `output_dir`. `markdown` is the published document.
    fn generate(&self, output_dir: &Path, markdown: &str) -> Result<()>;
}

/// Writes `index.html` with the Markdown embedded and rendered client-side.
pub struct ShellSiteGenerator {
    title: String,
}

impl ShellSiteGenerator {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

/// Escapes text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Drops the frontmatter block, which is metadata rather than page content.
fn strip_frontmatter(markdown: &str) -> &str {
    markdown
        .strip_prefix("---\n")
        .and_then(|rest| rest.find("\n---\n").map(|end| &rest[end + 5..]))
        .unwrap_or(markdown)
}

/// The page written by [`ShellSiteGenerator`]
pub fn shell_page(title: &str, markdown: &str) -> Result<String> {
    // Embedded as a JS string literal. Escaping every `<` keeps `</script>` and
    // `<!--` in the Markdown from affecting how the script element is parsed.
    let payload = serde_json::to_string(strip_frontmatter(markdown))
        .context("Failed to encode Markdown for the HTML page")?
        .replace('<', "\\u003c");
    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/github-markdown-css/github-markdown.min.css">
    <style>
        body {{ margin: 0 auto; max-width: 980px; padding: 45px; }}
        aside.notice {{ background: #eef6fc; border-left: 4px solid #3b8dbd; padding: 8px 12px; }}
    </style>
</head>
<body>
    <article id="content" class="markdown-body"></article>
    <script src="https://cdn.jsdelivr.net/npm/marked/marked.min.js"></script>
    <script>
        document.getElementById('content').innerHTML = marked.parse({payload});
    </script>
</body>
</html>
"#,
        title = escape_html(title),
        payload = payload
    ))
}

impl SiteGenerator for ShellSiteGenerator {
    fn generate(&self, output_dir: &Path, markdown: &str) -> Result<()> {
        let target = output_dir.join("index.html");
        debug!("Writing HTML shell to {}", target.display());
        write_atomic(shell_page(&self.title, markdown)?, &target)
    }
}

/// Runs an external static-site generator in the output directory.
///
/// The generator is expected to read `source/index.md`. A non-zero exit status
/// fails the run.
pub struct CommandSiteGenerator {
    command: Vec<String>,
}

impl CommandSiteGenerator {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl SiteGenerator for CommandSiteGenerator {
    fn generate(&self, output_dir: &Path, _markdown: &str) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .context("Site command is empty")?;
        let line = self.command.join(" ");

        info!("Running site command: {}", line);
        let output = Command::new(program)
            .args(args)
            .current_dir(output_dir)
            .output()
            .with_context(|| format!("Failed to run site command: {}", line))?;

        if !output.status.success() {
            anyhow::bail!(
                "Site command '{}' failed with {}: {}",
                line,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Builds the site generator selected by `site-command`.
pub fn from_config(config: &DocConfig) -> Box<dyn SiteGenerator> {
    match &config.site_command {
        Some(command) => Box::new(CommandSiteGenerator::new(command.clone())),
        None => Box::new(ShellSiteGenerator::new(&config.title)),
    }
}

/// ReDoc page that loads `openapi.json` from the same directory.
pub fn interactive_page(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link href="https://fonts.googleapis.com/css?family=Montserrat:300,400,700|Roboto:300,400,700" rel="stylesheet">
    <style>
        body {{ margin: 0; padding: 0; }}
    </style>
</head>
<body>
    <redoc spec-url="openapi.json"></redoc>
    <script src="https://cdn.jsdelivr.net/npm/redoc@next/bundles/redoc.standalone.js"></script>
</body>
</html>
"#,
        title = escape_html(title)
    )
}
