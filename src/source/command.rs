use super::{RawRoute, RouteSource};
use anyhow::{Context, Result};
use log::debug;
use std::process::Command;

/// Runs a command that prints the application's route table as a JSON list.
///
/// The command is a program followed by its arguments, passed through without a
/// shell. A non-zero exit status is an error.
pub struct CommandRouteSource {
    command: Vec<String>,
}

impl CommandRouteSource {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl RouteSource for CommandRouteSource {
    fn list_routes(&self) -> Result<Vec<RawRoute>> {
        let (program, args) = self
            .command
            .split_first()
            .context("Route source command is empty")?;
        let line = self.command.join(" ");

        debug!("Running route source command: {}", line);
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run route source command: {}", line))?;

        if !output.status.success() {
            anyhow::bail!(
                "Route source command '{}' failed with {}: {}",
                line,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let routes: Vec<RawRoute> = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("Route source command '{}' printed invalid JSON", line))?;
        debug!("Route source command listed {} routes", routes.len());
        Ok(routes)
    }
}
