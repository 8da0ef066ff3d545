use crate::normalizer::decode_json;
use crate::route::{ParameterDescriptor, RouteRecord};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema generator - converts documented parameters to OpenAPI schemas
#[derive(Debug, Default)]
pub struct SchemaGenerator {
    /// Named component schemas collected while building
    schemas: IndexMap<String, Schema>,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Property>>,
    /// Default value, used by header parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Example value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Property definition for object schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub property_type: String,
    pub example: Value,
    pub description: String,
}

/// Loose truthiness: null, false, zero, `""`, `"0"` and empty collections are empty.
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Maps a documented type and example onto OpenAPI terms.
///
/// `float` becomes `number`; `json` with a filled example becomes `object` and the
/// example is decoded when it is still a string.
pub fn coerce(parameter: &ParameterDescriptor) -> (String, Value) {
    match parameter.param_type.as_str() {
        "float" => ("number".to_string(), parameter.value.clone()),
        "json" if is_filled(&parameter.value) => {
            let example = match &parameter.value {
                Value::String(text) => decode_json(text),
                other => other.clone(),
            };
            ("object".to_string(), example)
        }
        other => (other.to_string(), parameter.value.clone()),
    }
}

/// The example request body of a route, name -> coerced example value.
pub fn example_body(route: &RouteRecord) -> Map<String, Value> {
    route
        .real_body_parameters()
        .map(|(name, parameter)| (name.clone(), coerce(parameter).1))
        .collect()
}

impl SchemaGenerator {
    /// Create an empty SchemaGenerator
    pub fn new() -> Self {
        debug!("Initializing SchemaGenerator");
        Self::default()
    }

    /// Schema of a single path or query parameter.
    ///
    /// The declared type and example are used as given; only body parameters are coerced.
    pub fn parameter_schema(&self, parameter: &ParameterDescriptor) -> Schema {
        Schema {
            schema_type: Some(parameter.param_type.clone()),
            example: Some(parameter.value.clone()),
            ..Default::default()
        }
    }

    /// Object schema describing a route's body parameters.
    ///
    /// `required`, `properties` and `example` are only set when they have content.
    pub fn body_schema(&self, route: &RouteRecord) -> Schema {
        debug!("Generating body schema for {}", route.uri);

        let mut required = Vec::new();
        let mut properties = IndexMap::new();
        let mut example = Map::new();

        for (name, parameter) in route.real_body_parameters() {
            let (property_type, value) = coerce(parameter);
            if parameter.required {
                required.push(name.clone());
            }
            properties.insert(
                name.clone(),
                Property {
                    property_type,
                    example: value.clone(),
                    description: parameter.description.clone(),
                },
            );
            example.insert(name.clone(), value);
        }

        Schema {
            schema_type: Some("object".to_string()),
            required: (!required.is_empty()).then_some(required),
            properties: (!properties.is_empty()).then_some(properties),
            example: (!example.is_empty()).then(|| Value::Object(example)),
            default: None,
        }
    }

    /// Registers the body schema of a route as a named component.
    ///
    /// Routes without a payment method reference are skipped.
    pub fn register_payment_method(&mut self, route: &RouteRecord) {
        let Some(payment_method) = &route.payment_method else {
            debug!("Route {} has no payment method, no component schema", route.uri);
            return;
        };
        let schema = self.body_schema(route);
        self.schemas.insert(payment_method.schema_name(), schema);
    }

    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        self.schemas
    }
}
