use crate::config::DocConfig;
use crate::route::{HttpMethod, ParameterDescriptor, RouteRecord};
use crate::samples::render_sample;
use crate::schema_generator::{Schema, SchemaGenerator};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the bearer security scheme
pub const BEARER_AUTH: &str = "BearerAuth";

/// OpenAPI document builder
pub struct OpenApiBuilder<'c> {
    config: &'c DocConfig,
    /// Paths collection (URL path -> PathItem)
    paths: IndexMap<String, PathItem>,
    schema_gen: SchemaGenerator,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Logo shown by ReDoc
    #[serde(rename = "x-logo", skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
}

/// ReDoc `x-logo` extension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logo {
    pub url: String,
    #[serde(rename = "altText")]
    pub alt_text: String,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    /// Stores `operation` under `method`, replacing any previous one.
    pub fn set(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        };
        if slot.is_some() {
            debug!("Replacing existing {} operation", method);
        }
        *slot = Some(operation);
    }

    pub fn get_operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Security requirements, present for authenticated routes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<IndexMap<String, Vec<String>>>>,
    pub tags: Vec<String>,
    /// Operation ID
    #[serde(rename = "operationId")]
    pub operation_id: String,
    pub description: String,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Parameters (path, query, header)
    pub parameters: Vec<Parameter>,
    /// Responses
    pub responses: IndexMap<String, Response>,
    /// Example requests, one per language tab
    #[serde(rename = "x-code-samples")]
    pub code_samples: Vec<CodeSample>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: String,
    /// Parameter name
    pub name: String,
    pub description: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    pub description: String,
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// `x-code-samples` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSample {
    /// Display name of the language
    pub lang: String,
    pub source: String,
}

/// OpenAPI security scheme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    pub scheme: String,
    #[serde(rename = "bearerFormat")]
    pub bearer_format: String,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    #[serde(rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
    /// Schema definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<IndexMap<String, Schema>>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    pub description: String,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    pub components: Components,
    pub servers: Vec<Server>,
    /// API paths
    pub paths: IndexMap<String, PathItem>,
}

fn json_content(schema: Schema) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert("application/json".to_string(), MediaType { schema });
    content
}

impl<'c> OpenApiBuilder<'c> {
    /// Create a new OpenApiBuilder for the given configuration
    pub fn new(config: &'c DocConfig) -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            config,
            paths: IndexMap::new(),
            schema_gen: SchemaGenerator::new(),
        }
    }

    /// Adds every route of a group.
    ///
    /// Routes of the configured schema group also register a component schema.
    pub fn add_group(&mut self, group: &str, routes: &[RouteRecord]) {
        debug!("Adding group '{}' with {} routes", group, routes.len());
        for route in routes {
            self.add_route(group, route);
            if group == self.config.schema_group {
                self.schema_gen.register_payment_method(route);
            }
        }
    }

    /// Add a route to the OpenAPI document
    pub fn add_route(&mut self, group: &str, route: &RouteRecord) {
        let method = route.primary_method();
        debug!("Adding route: {} {}", method, route.uri);

        let operation = self.operation(group, route);
        self.paths
            .entry(format!("/{}", route.uri))
            .or_default()
            .set(method, operation);
    }

    fn operation(&self, group: &str, route: &RouteRecord) -> Operation {
        let security = route.authenticated.then(|| {
            let mut requirement = IndexMap::new();
            requirement.insert(BEARER_AUTH.to_string(), Vec::new());
            vec![requirement]
        });

        let request_body = route.has_request_body().then(|| RequestBody {
            description: route.description.clone(),
            required: true,
            content: json_content(self.schema_gen.body_schema(route)),
        });

        Operation {
            security,
            tags: vec![group.to_string()],
            operation_id: route.title.clone(),
            description: route.description.clone(),
            request_body,
            parameters: self.parameters(route),
            responses: Self::responses(route),
            code_samples: self.code_samples(route),
        }
    }

    fn parameter(&self, location: &str, name: &str, descriptor: &ParameterDescriptor) -> Parameter {
        Parameter {
            location: location.to_string(),
            name: name.to_string(),
            description: descriptor.description.clone(),
            required: descriptor.required,
            schema: self.schema_gen.parameter_schema(descriptor),
        }
    }

    /// Path, query and header parameters, unique by location and name (last wins).
    fn parameters(&self, route: &RouteRecord) -> Vec<Parameter> {
        let mut merged: IndexMap<(String, String), Parameter> = IndexMap::new();
        let mut push = |parameter: Parameter| {
            merged.insert((parameter.location.clone(), parameter.name.clone()), parameter);
        };

        for (name, descriptor) in &route.path_parameters {
            push(self.parameter("path", name, descriptor));
        }
        for (name, descriptor) in &route.query_parameters {
            push(self.parameter("query", name, descriptor));
        }
        for (name, value) in route.documented_headers() {
            push(Parameter {
                location: "header".to_string(),
                name: name.clone(),
                description: String::new(),
                required: true,
                schema: Schema {
                    schema_type: Some("string".to_string()),
                    default: Some(Value::String(value.clone())),
                    example: Some(Value::String(value.clone())),
                    ..Default::default()
                },
            });
        }

        merged.into_values().collect()
    }

    fn responses(route: &RouteRecord) -> IndexMap<String, Response> {
        let content = route.response.first_content().map(|example| {
            json_content(Schema {
                schema_type: Some("object".to_string()),
                example: Some(example.clone()),
                ..Default::default()
            })
        });

        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: "success".to_string(),
                content,
            },
        );
        responses
    }

    fn code_samples(&self, route: &RouteRecord) -> Vec<CodeSample> {
        self.config
            .language_tabs
            .iter()
            .map(|(lang, name)| CodeSample {
                lang: name.clone(),
                source: render_sample(lang, route, self.config.base_url()),
            })
            .collect()
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let schemas = self.schema_gen.into_schemas();
        let mut security_schemes = IndexMap::new();
        security_schemes.insert(
            BEARER_AUTH.to_string(),
            SecurityScheme {
                scheme_type: "http".to_string(),
                scheme: "bearer".to_string(),
                bearer_format: "JWT".to_string(),
            },
        );

        let config = self.config;
        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: Info {
                title: config.title.clone(),
                version: config.version.clone(),
                description: Some(config.description.clone()),
                logo: config.logo.as_ref().map(|_| Logo {
                    url: "images/logo.png".to_string(),
                    alt_text: config.title.clone(),
                    background_color: String::new(),
                }),
            },
            components: Components {
                security_schemes,
                schemas: (!schemas.is_empty()).then_some(schemas),
            },
            servers: vec![Server {
                url: config.app_url.clone(),
                description: "Documentation generator server.".to_string(),
            }],
            paths: self.paths,
        }
    }
}
