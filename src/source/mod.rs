//! Route sources: where raw route descriptions come from.
//!
//! The generator never talks to a web framework directly. Instead a
//! [`RouteSource`] adapter hands over a list of [`RawRoute`]s, which the
//! [`matcher`] filters and the [`normalizer`](crate::normalizer) turns into
//! [`RouteRecord`](crate::route::RouteRecord)s.
//!
//! # Adapters
//!
//! - [`manifest::ManifestRouteSource`] reads YAML/JSON route manifests from disk
//! - [`command::CommandRouteSource`] runs a command that prints the route table as JSON

pub mod command;
pub mod manifest;
pub mod matcher;

use crate::config::{DocConfig, RouterKind};
use crate::route::{Parameters, PaymentMethodRef};
use crate::schema_generator::is_filled;
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Doc-block tag that hides a handler from the documentation
pub const HIDE_TAG: &str = "@hideFromAPIDocumentation";

/// Trait for adapters that list the routes of an application.
pub trait RouteSource {
    /// Lists every registered route, visible or not.
    fn list_routes(&self) -> Result<Vec<RawRoute>>;
}

/// A route as exported by the framework, before normalization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRoute {
    /// Explicit identifier; derived from uri and methods when absent
    pub id: Option<String>,
    /// Route name used by include/exclude rules
    pub name: Option<String>,
    pub domain: Option<String>,
    /// Handler reference, e.g. `UserController@show`
    pub handler: Option<String>,
    pub hidden: bool,
    /// Raw doc comment of the handler
    pub docblock: Option<String>,
    pub uri: String,
    pub methods: Vec<String>,
    pub title: String,
    pub description: String,
    pub group: Option<String>,
    pub authenticated: bool,
    pub headers: IndexMap<String, String>,
    pub path_parameters: Parameters,
    pub query_parameters: Parameters,
    pub body_parameters: Parameters,
    /// A body (string or JSON value) or a list of `{status, content}` objects
    pub response: Option<Value>,
    #[serde(alias = "showresponse", deserialize_with = "truthy")]
    pub show_response: bool,
    /// Any truthy value suppresses example requests and responses
    #[serde(rename = "type")]
    pub route_type: Option<Value>,
    pub payment_method: Option<PaymentMethodRef>,
}

impl RawRoute {
    /// Create a raw route with a handler, so it is visible by default
    pub fn new(uri: &str, methods: &[&str], handler: &str) -> Self {
        Self {
            uri: uri.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            handler: Some(handler.to_string()),
            ..Default::default()
        }
    }

    /// Whether the handler can be resolved and is not hidden from documentation.
    pub fn is_visible(&self) -> bool {
        let resolvable = self
            .handler
            .as_deref()
            .map(|h| !h.trim().is_empty())
            .unwrap_or(false);
        let tagged_hidden = self
            .docblock
            .as_deref()
            .map(|doc| doc.contains(HIDE_TAG))
            .unwrap_or(false);

        resolvable && !self.hidden && !tagged_hidden
    }

    /// Whether the `type` flag asks for examples to be left out.
    pub fn hides_examples(&self) -> bool {
        self.route_type.as_ref().map(is_filled).unwrap_or(false)
    }

    /// Name used by include/exclude rules: the route name, else the uri.
    pub fn rule_key(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.uri)
    }

    /// `[GET,POST] uri`, for log lines
    pub fn describe(&self) -> String {
        let methods: Vec<String> = self.methods.iter().map(|m| m.to_ascii_uppercase()).collect();
        format!("[{}] {}", methods.join(","), self.uri)
    }
}

/// Flags arrive as booleans, numbers or strings depending on the exporter.
fn truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| is_filled(&value))
}

/// Builds the adapter selected by the `router` setting.
pub fn from_config(config: &DocConfig) -> Box<dyn RouteSource> {
    match config.router {
        RouterKind::Manifest => Box::new(manifest::ManifestRouteSource::new(PathBuf::from(
            &config.source,
        ))),
        RouterKind::Command => Box::new(command::CommandRouteSource::new(
            config.source_command.clone(),
        )),
    }
}
