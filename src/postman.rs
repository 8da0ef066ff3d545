//! Postman collection (schema v2.1.0) encoder.
//!
//! One folder per group, one request per route. URLs are written against the
//! `{{baseUrl}}` collection variable so the collection can be pointed at another
//! host without editing every request.

use crate::config::DocConfig;
use crate::route::{HttpMethod, RouteRecord};
use crate::samples::pretty_json;
use crate::schema_generator::example_body;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub const SCHEMA_URL: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Name of the collection variable holding the application URL
pub const BASE_URL_VARIABLE: &str = "baseUrl";

/// Postman collection document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub variable: Vec<Variable>,
    pub info: CollectionInfo,
    /// One folder per group
    pub item: Vec<Folder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub variable_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    /// Stable id derived from the title
    #[serde(rename = "_postman_id")]
    pub postman_id: String,
    pub description: String,
    pub schema: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub description: String,
    pub item: Vec<Item>,
}

/// A single request with its saved example responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub request: Request,
    pub response: Vec<SavedResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub url: Url,
    pub method: String,
    pub header: Vec<Header>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Url {
    pub raw: String,
    pub host: Vec<String>,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParam>,
    /// Values of the `:name` path segments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<PathVariable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryParam {
    pub key: String,
    pub value: String,
    pub description: String,
    /// Optional parameters start disabled
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathVariable {
    pub key: String,
    pub value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

/// Request body in one of the Postman body modes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    /// `raw`, `urlencoded` or `formdata`
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urlencoded: Option<Vec<FormParam>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formdata: Option<Vec<FormParam>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormParam {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
}

/// An example response saved with the request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedResponse {
    pub name: String,
    pub code: u16,
    #[serde(rename = "_postman_previewlanguage")]
    pub preview_language: String,
    pub header: Vec<Header>,
    pub body: String,
}

/// Converts `{name}` and `{name?}` segments to Postman's `:name` form.
pub fn postman_path(uri: &str) -> Vec<String> {
    uri.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => format!(":{}", name.trim_end_matches('?')),
                None => segment.to_string(),
            }
        })
        .collect()
}

/// Deterministic UUID-shaped id, so regenerating yields the same collection.
fn collection_id(title: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    let hex: String = digest.iter().take(16).map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

fn body_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => pretty_json(other),
    }
}

/// Postman collection builder
pub struct CollectionBuilder<'c> {
    config: &'c DocConfig,
    folders: Vec<Folder>,
}

impl<'c> CollectionBuilder<'c> {
    pub fn new(config: &'c DocConfig) -> Self {
        Self {
            config,
            folders: Vec::new(),
        }
    }

    /// Adds a folder holding one request per route
    pub fn add_group(&mut self, group: &str, routes: &[RouteRecord]) {
        debug!("Adding Postman folder '{}' with {} requests", group, routes.len());
        self.folders.push(Folder {
            name: group.to_string(),
            description: String::new(),
            item: routes.iter().map(Self::item).collect(),
        });
    }

    fn item(route: &RouteRecord) -> Item {
        Item {
            name: route.heading().to_string(),
            request: Request {
                url: Self::url(route),
                method: route.primary_method().to_string(),
                header: Self::headers(route),
                body: Self::body(route),
                description: route.description.clone(),
            },
            response: Self::responses(route),
        }
    }

    fn url(route: &RouteRecord) -> Url {
        let path = postman_path(&route.uri);
        let query: Vec<QueryParam> = route
            .query_parameters
            .iter()
            .map(|(name, parameter)| QueryParam {
                key: name.clone(),
                value: parameter.value_text(),
                description: parameter.description.clone(),
                disabled: !parameter.required,
            })
            .collect();
        let variable = route
            .path_parameters
            .iter()
            .map(|(name, parameter)| PathVariable {
                key: name.clone(),
                value: parameter.value_text(),
                description: parameter.description.clone(),
            })
            .collect();

        let mut raw = format!("{{{{{}}}}}/{}", BASE_URL_VARIABLE, path.join("/"));
        let enabled: Vec<String> = query
            .iter()
            .filter(|q| !q.disabled)
            .map(|q| format!("{}={}", q.key, q.value))
            .collect();
        if !enabled.is_empty() {
            raw.push('?');
            raw.push_str(&enabled.join("&"));
        }

        Url {
            raw,
            host: vec![format!("{{{{{}}}}}", BASE_URL_VARIABLE)],
            path,
            query,
            variable,
        }
    }

    /// Route headers followed by `Accept: application/json` unless already set.
    fn headers(route: &RouteRecord) -> Vec<Header> {
        let mut headers: Vec<Header> = route
            .headers
            .iter()
            .map(|(key, value)| Header {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        if !headers.iter().any(|h| h.key.eq_ignore_ascii_case("Accept")) {
            headers.push(Header {
                key: "Accept".to_string(),
                value: "application/json".to_string(),
            });
        }
        headers
    }

    fn body(route: &RouteRecord) -> Option<Body> {
        let mut parameters = route.real_body_parameters().peekable();
        parameters.peek()?;

        let structured = route
            .real_body_parameters()
            .any(|(_, p)| matches!(p.param_type.as_str(), "json" | "object" | "array"));
        if structured {
            return Some(Body {
                mode: "raw".to_string(),
                raw: Some(pretty_json(&Value::Object(example_body(route)))),
                urlencoded: None,
                formdata: None,
            });
        }

        let fields: Vec<FormParam> = parameters
            .map(|(name, parameter)| FormParam {
                key: name.clone(),
                value: parameter.value_text(),
                param_type: "text".to_string(),
                description: parameter.description.clone(),
            })
            .collect();

        let urlencoded = matches!(route.primary_method(), HttpMethod::Put | HttpMethod::Patch);
        Some(if urlencoded {
            Body {
                mode: "urlencoded".to_string(),
                raw: None,
                urlencoded: Some(fields),
                formdata: None,
            }
        } else {
            Body {
                mode: "formdata".to_string(),
                raw: None,
                urlencoded: None,
                formdata: Some(fields),
            }
        })
    }

    fn responses(route: &RouteRecord) -> Vec<SavedResponse> {
        route
            .response
            .entries()
            .into_iter()
            .map(|(code, content)| SavedResponse {
                name: format!("{} ({})", route.heading(), code),
                code,
                preview_language: "json".to_string(),
                header: vec![Header {
                    key: "Content-Type".to_string(),
                    value: "application/json".to_string(),
                }],
                body: body_text(content),
            })
            .collect()
    }

    pub fn build(self) -> PostmanCollection {
        debug!("Building Postman collection with {} folders", self.folders.len());
        let config = self.config;
        PostmanCollection {
            variable: vec![Variable {
                id: BASE_URL_VARIABLE.to_string(),
                key: BASE_URL_VARIABLE.to_string(),
                value: config.base_url().to_string(),
                variable_type: "string".to_string(),
            }],
            info: CollectionInfo {
                name: config.title.clone(),
                postman_id: collection_id(&config.title),
                description: config.description.clone(),
                schema: SCHEMA_URL.to_string(),
            },
            item: self.folders,
        }
    }
}
