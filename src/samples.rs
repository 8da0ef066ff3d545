//! Example request snippets, one per configured language tab.
//!
//! The same snippet text is embedded in the Markdown fences and in the OpenAPI
//! `x-code-samples` extension.

use crate::route::{HttpMethod, RouteRecord};
use crate::schema_generator::example_body;
use crate::serializer::serialize_json;
use serde_json::Value;

/// Languages with a snippet renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleLanguage {
    Bash,
    Javascript,
    Php,
    Python,
}

impl SampleLanguage {
    /// Resolves a `language-tabs` key
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "bash" | "shell" | "sh" | "curl" => Some(SampleLanguage::Bash),
            "javascript" | "js" => Some(SampleLanguage::Javascript),
            "php" => Some(SampleLanguage::Php),
            "python" | "py" => Some(SampleLanguage::Python),
            _ => None,
        }
    }
}

/// Renders the example request for `route` in the language named by `key`.
pub fn render_sample(key: &str, route: &RouteRecord, base_url: &str) -> String {
    match SampleLanguage::from_key(key) {
        Some(SampleLanguage::Bash) => bash(route, base_url),
        Some(SampleLanguage::Javascript) => javascript(route, base_url),
        Some(SampleLanguage::Php) => php(route, base_url),
        Some(SampleLanguage::Python) => python(route, base_url),
        None => format!("No {} example is available for this request.", key),
    }
}

/// Absolute URL of the route, without query string
pub fn route_url(route: &RouteRecord, base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), route.uri)
}

fn query_string(route: &RouteRecord) -> String {
    route
        .query_parameters
        .iter()
        .map(|(name, p)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(&p.value_text())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn sends_body(route: &RouteRecord) -> bool {
    route.primary_method() != HttpMethod::Get && route.real_body_parameters().next().is_some()
}

/// Pretty JSON with four-space indentation
pub fn pretty_json(value: &Value) -> String {
    serialize_json(value).unwrap_or_else(|_| value.to_string())
}

fn quoted(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn bash(route: &RouteRecord, base_url: &str) -> String {
    let method = route.primary_method();
    let mut url = route_url(route, base_url);
    let query = query_string(route);
    if !query.is_empty() {
        url = format!("{}?{}", url, query);
    }

    let mut lines = vec![format!(
        "curl -X {} {}\"{}\"",
        method,
        if method == HttpMethod::Get { "-G " } else { "" },
        url
    )];
    for (name, value) in &route.headers {
        lines.push(format!("-H \"{}: {}\"", name, value));
    }
    if sends_body(route) {
        for (name, parameter) in route.real_body_parameters() {
            lines.push(format!("-d \"{}\"=\"{}\"", name, parameter.value_text()));
        }
    }
    lines.join(" \\\n    ")
}

fn javascript(route: &RouteRecord, base_url: &str) -> String {
    let mut out = format!("const url = new URL(\"{}\");\n", route_url(route, base_url));

    if !route.query_parameters.is_empty() {
        out.push_str("\nlet params = {\n");
        for (name, p) in &route.query_parameters {
            out.push_str(&format!("    {}: {},\n", quoted(name), quoted(&p.value_text())));
        }
        out.push_str("};\nObject.keys(params).forEach(key => url.searchParams.append(key, params[key]));\n");
    }

    out.push_str("\nlet headers = {\n");
    for (name, value) in &route.headers {
        out.push_str(&format!("    {}: {},\n", quoted(name), quoted(value)));
    }
    if !route.headers.contains_key("Accept") {
        out.push_str("    \"Accept\": \"application/json\",\n");
    }
    out.push_str("    \"Content-Type\": \"application/json\",\n};\n");

    let body = sends_body(route);
    if body {
        let payload = pretty_json(&Value::Object(example_body(route)));
        out.push_str(&format!("\nlet body = {};\n", payload));
    }

    out.push_str(&format!(
        "\nfetch(url, {{\n    method: \"{}\",\n    headers: headers,\n",
        route.primary_method()
    ));
    if body {
        out.push_str("    body: JSON.stringify(body),\n");
    }
    out.push_str("})\n    .then(response => response.json())\n    .then(json => console.log(json));");
    out
}

fn php_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(php_literal).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{}' => {}", k.replace('\'', "\\'"), php_literal(v)))
                .collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

fn php_array_block(key: &str, entries: Vec<(String, Value)>) -> String {
    let mut out = format!("    '{}' => [\n", key);
    for (name, value) in entries {
        out.push_str(&format!(
            "        {} => {},\n",
            php_literal(&Value::String(name)),
            php_literal(&value)
        ));
    }
    out.push_str("    ],\n");
    out
}

fn php(route: &RouteRecord, base_url: &str) -> String {
    let mut out = String::from("$client = new \\GuzzleHttp\\Client();\n");
    out.push_str(&format!(
        "$response = $client->{}(\"{}\", [\n",
        route.primary_method().as_str().to_ascii_lowercase(),
        route_url(route, base_url)
    ));

    if !route.headers.is_empty() {
        let headers = route
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        out.push_str(&php_array_block("headers", headers));
    }
    if !route.query_parameters.is_empty() {
        let query = route
            .query_parameters
            .iter()
            .map(|(k, p)| (k.clone(), Value::String(p.value_text())))
            .collect();
        out.push_str(&php_array_block("query", query));
    }
    if sends_body(route) {
        out.push_str(&php_array_block("json", example_body(route).into_iter().collect()));
    }

    out.push_str("]);\n$body = $response->getBody();\nprint_r(json_decode((string) $body));");
    out
}

fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quoted(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quoted(k), python_literal(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}

fn python_dict(name: &str, entries: Vec<(String, Value)>) -> String {
    let mut out = format!("{} = {{\n", name);
    for (key, value) in entries {
        out.push_str(&format!("    {}: {},\n", quoted(&key), python_literal(&value)));
    }
    out.push_str("}\n");
    out
}

fn python(route: &RouteRecord, base_url: &str) -> String {
    let mut out = String::from("import requests\nimport json\n\n");
    out.push_str(&format!("url = {}\n", quoted(&route_url(route, base_url))));

    let mut arguments = Vec::new();
    if !route.query_parameters.is_empty() {
        let params = route
            .query_parameters
            .iter()
            .map(|(k, p)| (k.clone(), Value::String(p.value_text())))
            .collect();
        out.push_str(&python_dict("params", params));
        arguments.push("params=params");
    }
    if sends_body(route) {
        out.push_str(&python_dict("payload", example_body(route).into_iter().collect()));
        arguments.push("json=payload");
    }
    let headers = route
        .headers
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    out.push_str(&python_dict("headers", headers));
    arguments.insert(0, "headers=headers");

    out.push_str(&format!(
        "response = requests.request({}, url, {})\nresponse.json()",
        quoted(route.primary_method().as_str()),
        arguments.join(", ")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::ParameterDescriptor;
    use serde_json::json;

    fn create_route() -> RouteRecord {
        let mut route = RouteRecord::new("r1", "users", HttpMethod::Post);
        route.headers.insert("Authorization".to_string(), "Bearer {token}".to_string());
        route.query_parameters.insert(
            "lang".to_string(),
            ParameterDescriptor::new("string", false, "", json!("en us")),
        );
        route.body_parameters.insert(
            "name".to_string(),
            ParameterDescriptor::new("string", true, "", json!("Jane")),
        );
        route
    }

    #[test]
    fn test_language_keys() {
        assert_eq!(SampleLanguage::from_key("shell"), Some(SampleLanguage::Bash));
        assert_eq!(SampleLanguage::from_key("JS"), Some(SampleLanguage::Javascript));
        assert_eq!(SampleLanguage::from_key("cobol"), None);
    }

    #[test]
    fn test_bash_sample() {
        let sample = render_sample("bash", &create_route(), "http://localhost/");
        assert_eq!(
            sample,
            "curl -X POST \"http://localhost/users?lang=en%20us\" \\\n    \
             -H \"Authorization: Bearer {token}\" \\\n    \
             -d \"name\"=\"Jane\""
        );
    }

    #[test]
    fn test_bash_get_sample_has_no_body() {
        let mut route = RouteRecord::new("r2", "users", HttpMethod::Get);
        route.body_parameters.insert(
            "ignored".to_string(),
            ParameterDescriptor::new("string", false, "", json!("x")),
        );
        assert_eq!(
            render_sample("curl", &route, "http://localhost"),
            "curl -X GET -G \"http://localhost/users\""
        );
    }

    #[test]
    fn test_javascript_sample() {
        let sample = render_sample("javascript", &create_route(), "http://localhost");
        assert!(sample.starts_with("const url = new URL(\"http://localhost/users\");"));
        assert!(sample.contains("\"lang\": \"en us\","));
        assert!(sample.contains("\"Accept\": \"application/json\","));
        assert!(sample.contains("let body = {\n    \"name\": \"Jane\"\n};"));
        assert!(sample.contains("method: \"POST\""));
        assert!(sample.contains("body: JSON.stringify(body),"));
    }

    #[test]
    fn test_php_sample() {
        let sample = render_sample("php", &create_route(), "http://localhost");
        assert!(sample.contains("$client->post(\"http://localhost/users\", ["));
        assert!(sample.contains("'query' => [\n        'lang' => 'en us',"));
        assert!(sample.contains("'json' => [\n        'name' => 'Jane',"));
    }

    #[test]
    fn test_python_sample() {
        let sample = render_sample("python", &create_route(), "http://localhost");
        assert!(sample.contains("url = \"http://localhost/users\""));
        assert!(sample.contains("payload = {\n    \"name\": \"Jane\",\n}"));
        assert!(sample.ends_with(
            "requests.request(\"POST\", url, headers=headers, params=params, json=payload)\nresponse.json()"
        ));
    }

    #[test]
    fn test_unknown_language() {
        let sample = render_sample("cobol", &create_route(), "http://localhost");
        assert_eq!(sample, "No cobol example is available for this request.");
    }

    #[test]
    fn test_pretty_json_four_spaces_keeps_order() {
        let value: Value = serde_json::from_str(r#"{"b":1,"a":[true]}"#).unwrap();
        assert_eq!(
            pretty_json(&value),
            "{\n    \"b\": 1,\n    \"a\": [\n        true\n    ]\n}"
        );
    }
}
