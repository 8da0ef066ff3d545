//! Shapes raw routes into [`RouteRecord`]s and groups them.
//!
//! Normalization is where loosely typed route data becomes the strict record every
//! encoder relies on: verbs are validated, ids derived, example responses decoded
//! into structured JSON and rule headers merged in.

use crate::error::{Error, Result};
use crate::route::{HttpMethod, ResponseExample, ResponseExamples, RouteRecord};
use crate::source::matcher::MatchedRoute;
use crate::source::RawRoute;
use indexmap::{IndexMap, IndexSet};
use log::{info, warn};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Routes grouped by group name, groups in order of first appearance.
pub type RouteGroups = IndexMap<String, Vec<RouteRecord>>;

/// Derives the stable route id from uri and methods.
pub fn route_id(uri: &str, methods: &[HttpMethod]) -> String {
    let verbs: String = methods.iter().map(HttpMethod::as_str).collect();
    let digest = Sha256::digest(format!("{}:{}", uri, verbs).as_bytes());
    digest[..16].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decodes a JSON string. Invalid JSON becomes `null` so one bad example cannot
/// abort the run.
pub fn decode_json(text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!("Example is not valid JSON, using null instead: {}", e);
            Value::Null
        }
    }
}

/// Turns a string into structured JSON; structured values pass through.
fn structured(value: &Value) -> Value {
    match value {
        Value::String(text) => decode_json(text),
        other => other.clone(),
    }
}

fn is_response_entry(value: &Value) -> bool {
    value
        .as_object()
        .map(|obj| obj.contains_key("content") || obj.contains_key("status"))
        .unwrap_or(false)
}

fn parse_status(value: Option<&Value>) -> u16 {
    match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()).unwrap_or(200),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(200),
        _ => 200,
    }
}

/// Normalizes the `response` field of a raw route.
///
/// A list whose items are `{status, content}` objects becomes
/// [`ResponseExamples::Multiple`]; anything else is a single body.
pub fn normalize_response(response: Option<&Value>) -> ResponseExamples {
    match response {
        None | Some(Value::Null) => ResponseExamples::None,
        Some(Value::Array(items)) if !items.is_empty() && items.iter().all(is_response_entry) => {
            ResponseExamples::Multiple(
                items
                    .iter()
                    .map(|item| ResponseExample {
                        status: parse_status(item.get("status")),
                        content: item.get("content").map(structured).unwrap_or(Value::Null),
                    })
                    .collect(),
            )
        }
        Some(Value::Array(items)) if items.is_empty() => ResponseExamples::Multiple(Vec::new()),
        Some(body) => ResponseExamples::Single(structured(body)),
    }
}

fn normalize_methods(raw: &RawRoute) -> Result<Vec<HttpMethod>> {
    let mut methods = IndexSet::new();
    for verb in &raw.methods {
        let method = HttpMethod::parse(verb)
            .ok_or_else(|| Error::invalid_route(&raw.uri, format!("unknown HTTP method '{}'", verb)))?;
        methods.insert(method);
    }
    if methods.len() > 1 {
        methods.shift_remove(&HttpMethod::Head);
    }
    if methods.is_empty() {
        return Err(Error::invalid_route(&raw.uri, "no HTTP methods"));
    }
    Ok(methods.into_iter().collect())
}

/// Builds the record for one selected route.
///
/// # Errors
///
/// Returns [`Error::InvalidRoute`] when the route has no methods or an unknown verb.
pub fn normalize(matched: &MatchedRoute, default_group: &str) -> Result<RouteRecord> {
    let raw = &matched.route;
    let methods = normalize_methods(raw)?;
    let uri = raw.uri.trim().trim_start_matches('/').to_string();

    let id = match raw.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => route_id(&uri, &methods),
    };

    let group = raw
        .group
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(default_group)
        .to_string();

    let mut headers = matched.apply.headers.clone();
    for (name, value) in &raw.headers {
        headers.insert(name.clone(), value.clone());
    }

    Ok(RouteRecord {
        id,
        title: raw.title.trim().to_string(),
        description: raw.description.trim().to_string(),
        group,
        methods,
        uri,
        authenticated: raw.authenticated,
        headers,
        path_parameters: raw.path_parameters.clone(),
        query_parameters: raw.query_parameters.clone(),
        body_parameters: raw.body_parameters.clone(),
        response: normalize_response(raw.response.as_ref()),
        show_response: raw.show_response,
        hide_examples: raw.hides_examples(),
        payment_method: raw.payment_method.clone(),
    })
}

/// Normalizes every visible route and groups the results.
///
/// Hidden or unresolvable routes, routes that fail normalization and routes whose id
/// was already taken are skipped with a warning; none of them aborts the batch.
pub fn process_routes(matched: &[MatchedRoute], default_group: &str) -> RouteGroups {
    let mut groups = RouteGroups::new();
    let mut seen_ids = IndexSet::new();

    for item in matched {
        let raw = &item.route;
        if !raw.is_visible() {
            warn!("Skipping route: {}", raw.describe());
            continue;
        }

        let record = match normalize(item, default_group) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping route: {} ({})", raw.describe(), e);
                continue;
            }
        };

        if !seen_ids.insert(record.id.clone()) {
            warn!("Skipping route with duplicate id {}: {}", record.id, raw.describe());
            continue;
        }

        info!("Processed route: [{}] {}", record.methods_label(), record.uri);
        groups.entry(record.group.clone()).or_default().push(record);
    }

    groups
}
