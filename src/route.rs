//! The canonical route description shared by every output encoder.
//!
//! A [`RouteRecord`] is produced once per generation run by the
//! [`normalizer`](crate::normalizer) and is read-only from then on: the Markdown
//! renderer, the merge engine, the Postman encoder and the OpenAPI builder all
//! consume the same records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body parameter key that carries a free-form note instead of a parameter.
pub const NOTE_PARAMETER: &str = "-";

/// Ordered parameter mapping, name -> descriptor.
pub type Parameters = IndexMap<String, ParameterDescriptor>;

/// HTTP methods a route may answer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
}

impl HttpMethod {
    /// Parses a verb case-insensitively. Returns `None` for unknown verbs.
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    /// Upper-case verb as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Whether requests with this verb carry a documented body.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of a single path, query or body parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterDescriptor {
    /// Declared type, e.g. `string`, `integer`, `float`, `json`
    #[serde(rename = "type")]
    pub param_type: String,
    pub required: bool,
    pub description: String,
    /// Example value
    #[serde(alias = "example")]
    pub value: Value,
}

impl Default for ParameterDescriptor {
    fn default() -> Self {
        Self {
            param_type: "string".to_string(),
            required: false,
            description: String::new(),
            value: Value::Null,
        }
    }
}

impl ParameterDescriptor {
    /// Create a descriptor with an example value
    pub fn new(param_type: &str, required: bool, description: &str, value: Value) -> Self {
        Self {
            param_type: param_type.to_string(),
            required,
            description: description.to_string(),
            value,
        }
    }

    /// The example rendered as plain text, without JSON quoting for strings.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// One example response with its status code. `content` is always structured JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseExample {
    pub status: u16,
    pub content: Value,
}

/// Example responses attached to a route.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseExamples {
    /// No example response
    #[default]
    None,
    /// A single unlabeled response body
    Single(Value),
    /// Ordered responses, each labeled by status
    Multiple(Vec<ResponseExample>),
}

impl ResponseExamples {
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseExamples::None => true,
            ResponseExamples::Single(_) => false,
            ResponseExamples::Multiple(list) => list.is_empty(),
        }
    }

    /// Content of the first example, if any
    pub fn first_content(&self) -> Option<&Value> {
        match self {
            ResponseExamples::None => None,
            ResponseExamples::Single(content) => Some(content),
            ResponseExamples::Multiple(list) => list.first().map(|r| &r.content),
        }
    }

    /// All examples as (status, content) pairs. A single body reports status 200.
    pub fn entries(&self) -> Vec<(u16, &Value)> {
        match self {
            ResponseExamples::None => Vec::new(),
            ResponseExamples::Single(content) => vec![(200, content)],
            ResponseExamples::Multiple(list) => list.iter().map(|r| (r.status, &r.content)).collect(),
        }
    }
}

/// Back-reference from a route to the payment method it configures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodRef {
    pub id: Value,
}

impl PaymentMethodRef {
    /// Name of the component schema generated for this payment method
    pub fn schema_name(&self) -> String {
        match &self.id {
            Value::String(s) => format!("PM{}", s),
            other => format!("PM{}", other),
        }
    }
}

/// Complete, normalized description of one documented endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRecord {
    /// Stable identifier, unique per uri + method set
    pub id: String,
    pub title: String,
    pub description: String,
    /// Logical group used for headings and tags
    pub group: String,
    /// Never empty; the first verb keys the OpenAPI operation
    pub methods: Vec<HttpMethod>,
    /// Path template without a leading slash, e.g. `users/{id}`
    pub uri: String,
    pub authenticated: bool,
    pub headers: IndexMap<String, String>,
    pub path_parameters: Parameters,
    pub query_parameters: Parameters,
    pub body_parameters: Parameters,
    pub response: ResponseExamples,
    /// Force example responses even for non-GET routes
    pub show_response: bool,
    /// Suppress example requests and responses entirely
    pub hide_examples: bool,
    pub payment_method: Option<PaymentMethodRef>,
}

impl RouteRecord {
    /// Create a record with the minimal required fields
    pub fn new(id: &str, uri: &str, method: HttpMethod) -> Self {
        Self {
            id: id.to_string(),
            title: String::new(),
            description: String::new(),
            group: "general".to_string(),
            methods: vec![method],
            uri: uri.trim_start_matches('/').to_string(),
            authenticated: false,
            headers: IndexMap::new(),
            path_parameters: Parameters::new(),
            query_parameters: Parameters::new(),
            body_parameters: Parameters::new(),
            response: ResponseExamples::None,
            show_response: false,
            hide_examples: false,
            payment_method: None,
        }
    }

    /// The verb that keys this route's OpenAPI operation.
    pub fn primary_method(&self) -> HttpMethod {
        self.methods.first().copied().unwrap_or(HttpMethod::Get)
    }

    /// Methods joined with commas, as used in log lines
    pub fn methods_label(&self) -> String {
        self.methods.iter().map(HttpMethod::as_str).collect::<Vec<_>>().join(",")
    }

    /// Heading text: the title, falling back to the uri.
    pub fn heading(&self) -> &str {
        if self.title.is_empty() {
            &self.uri
        } else {
            &self.title
        }
    }

    pub fn has_request_body(&self) -> bool {
        self.methods.iter().any(HttpMethod::carries_body)
    }

    /// Whether example response blocks are rendered for this route
    pub fn shows_response(&self) -> bool {
        self.show_response || self.methods.contains(&HttpMethod::Get)
    }

    /// Body parameters without the free-form note entry
    pub fn real_body_parameters(&self) -> impl Iterator<Item = (&String, &ParameterDescriptor)> {
        self.body_parameters
            .iter()
            .filter(|(name, _)| name.as_str() != NOTE_PARAMETER)
    }

    /// Headers that document the request, i.e. everything except `Authorization`.
    pub fn documented_headers(&self) -> impl Iterator<Item = (&String, &String)> {
        self.headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("Authorization"))
    }
}
