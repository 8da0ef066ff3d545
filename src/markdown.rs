//! Markdown rendering.
//!
//! Every route becomes a self-contained fragment wrapped in
//! `<!-- START_<id> -->` / `<!-- END_<id> -->` comments. The markers let the
//! [`merge`](crate::merge) engine find the same route again in a document that
//! was edited by hand. Fragments are then concatenated under group headings,
//! between the frontmatter, the info block and the optional prepend/append files.

use crate::config::DocConfig;
use crate::route::{Parameters, RouteRecord, NOTE_PARAMETER};
use crate::samples::{pretty_json, render_sample};

pub const INFO_START: &str = "<!-- START_INFO -->";
pub const INFO_END: &str = "<!-- END_INFO -->";

pub fn start_marker(id: &str) -> String {
    format!("<!-- START_{} -->", id)
}

pub fn end_marker(id: &str) -> String {
    format!("<!-- END_{} -->", id)
}

fn status_label(required: bool) -> &'static str {
    if required {
        "required"
    } else {
        "optional"
    }
}

fn path_table(parameters: &Parameters) -> String {
    let mut out = String::from(
        "#### Path Parameters\n\nParameter | Type | Description\n--------- | ---- | -----------",
    );
    for (name, p) in parameters {
        out.push_str(&format!("\n{} | {} | {}", name, p.param_type, p.description));
    }
    out
}

fn query_table(parameters: &Parameters) -> String {
    let mut out = String::from(
        "#### Query Parameters\n\nParameter | Status | Description\n--------- | ------ | -----------",
    );
    for (name, p) in parameters {
        out.push_str(&format!("\n{} | {} | {}", name, status_label(p.required), p.description));
    }
    out
}

fn body_table(parameters: &Parameters) -> String {
    let mut out = String::from(
        "#### Body Parameters\n\nParameter | Type | Status | Description\n--------- | ---- | ------ | -----------",
    );
    for (name, p) in parameters {
        if name == NOTE_PARAMETER {
            out.push_str(&format!("\n| <td colspan=\"4\"> {} </td>", p.description));
        } else {
            out.push_str(&format!(
                "\n{} | {} | {} | {}",
                name,
                p.param_type,
                status_label(p.required),
                p.description
            ));
        }
    }
    out
}

fn response_blocks(route: &RouteRecord) -> Vec<String> {
    use crate::route::ResponseExamples;

    match &route.response {
        ResponseExamples::None => Vec::new(),
        ResponseExamples::Single(content) => vec![format!(
            "> Example response:\n\n```json\n{}\n```",
            pretty_json(content)
        )],
        ResponseExamples::Multiple(list) => list
            .iter()
            .map(|response| {
                format!(
                    "> Example response ({}):\n\n```json\n{}\n```",
                    response.status,
                    pretty_json(&response.content)
                )
            })
            .collect(),
    }
}

/// Renders the delimited Markdown fragment of one route.
pub fn render_route(route: &RouteRecord, config: &DocConfig) -> String {
    let mut blocks = vec![format!("## {}", route.heading())];

    if !route.description.is_empty() {
        blocks.push(route.description.clone());
    }
    if route.authenticated {
        blocks.push("<br><aside class=\"notice\">Requires authentication.</aside>".to_string());
    }

    if !route.hide_examples {
        blocks.push("> Example request:".to_string());
        for lang in config.language_tabs.keys() {
            blocks.push(format!(
                "```{}\n{}\n```",
                lang,
                render_sample(lang, route, config.base_url())
            ));
        }
        if route.shows_response() {
            blocks.extend(response_blocks(route));
        }
    }

    if !route.path_parameters.is_empty() {
        blocks.push(path_table(&route.path_parameters));
    }
    if !route.query_parameters.is_empty() {
        blocks.push(query_table(&route.query_parameters));
    }
    if !route.body_parameters.is_empty() {
        blocks.push(body_table(&route.body_parameters));
    }

    format!(
        "{}\n{}\n\n{}",
        start_marker(&route.id),
        blocks.join("\n\n"),
        end_marker(&route.id)
    )
}

/// Frontmatter used when the published document has none.
pub fn default_frontmatter(config: &DocConfig) -> String {
    let mut out = format!("title: {}\n\nlanguage_tabs:", config.title);
    for lang in config.language_tabs.keys() {
        out.push_str(&format!("\n- {}", lang));
    }
    out.push_str("\n\nsearch: true");
    out
}

/// The introduction fragment, also written on its own as `info.md`.
pub fn render_info(config: &DocConfig) -> String {
    let mut out = String::from("# Info\n");
    if !config.description.is_empty() {
        out.push_str(&format!("\n{}\n", config.description));
    }
    if config.collections {
        out.push_str("\n[Get Postman Collection](collection.json)\n");
    }
    out
}

/// Surrounding text of the route fragments
#[derive(Debug, Clone, Default)]
pub struct DocumentParts {
    pub frontmatter: String,
    pub info: String,
    /// Contents of `prepend.md`, empty when absent
    pub prepend: String,
    /// Contents of `append.md`, empty when absent
    pub append: String,
}

/// Concatenates route fragments under their group headings into the full document.
pub fn assemble<'a, G, F>(parts: &DocumentParts, groups: G) -> String
where
    G: IntoIterator<Item = (&'a str, F)>,
    F: IntoIterator<Item = &'a str>,
{
    let mut doc = format!(
        "---\n{}\n---\n{}\n{}\n{}\n",
        parts.frontmatter.trim_matches('\n'),
        INFO_START,
        parts.info.trim_end(),
        INFO_END
    );
    if !parts.prepend.is_empty() {
        doc.push_str(&parts.prepend);
        doc.push('\n');
    }

    for (group, fragments) in groups {
        if !group.is_empty() {
            doc.push_str(&format!("\n# {}\n", group));
        }
        for fragment in fragments {
            doc.push('\n');
            doc.push_str(fragment);
            doc.push('\n');
        }
    }

    if !parts.append.is_empty() {
        doc.push('\n');
        doc.push_str(&parts.append);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{HttpMethod, ParameterDescriptor, ResponseExample, ResponseExamples};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config_without_tabs() -> DocConfig {
        DocConfig {
            language_tabs: IndexMap::new(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_route_fragment() {
        let route = RouteRecord::new("abc", "users", HttpMethod::Delete);
        let output = render_route(&route, &config_without_tabs());
        assert_eq!(
            output,
            "<!-- START_abc -->\n## users\n\n> Example request:\n\n<!-- END_abc -->"
        );
    }

    #[test]
    fn test_title_description_and_auth() {
        let mut route = RouteRecord::new("abc", "users", HttpMethod::Delete);
        route.title = "Delete user".to_string();
        route.description = "Removes the user.".to_string();
        route.authenticated = true;
        route.hide_examples = true;

        let output = render_route(&route, &config_without_tabs());
        assert_eq!(
            output,
            "<!-- START_abc -->\n## Delete user\n\nRemoves the user.\n\n\
             <br><aside class=\"notice\">Requires authentication.</aside>\n\n<!-- END_abc -->"
        );
    }

    #[test]
    fn test_string_response_renders_pretty_block() {
        let mut route = RouteRecord::new("abc", "users", HttpMethod::Get);
        route.response = ResponseExamples::Single(json!({"a": 1}));

        let output = render_route(&route, &config_without_tabs());
        assert!(output.contains("> Example response:\n\n```json\n{\n    \"a\": 1\n}\n```"));
    }

    #[test]
    fn test_multiple_responses_are_labeled() {
        let mut route = RouteRecord::new("abc", "users", HttpMethod::Post);
        route.show_response = true;
        route.response = ResponseExamples::Multiple(vec![
            ResponseExample { status: 200, content: json!({"a": 1}) },
            ResponseExample { status: 422, content: json!(null) },
        ]);

        let output = render_route(&route, &config_without_tabs());
        assert!(output.contains("> Example response (200):\n\n```json\n{\n    \"a\": 1\n}\n```"));
        assert!(output.contains("> Example response (422):\n\n```json\nnull\n```"));
    }

    #[test]
    fn test_post_route_hides_response_unless_requested() {
        let mut route = RouteRecord::new("abc", "users", HttpMethod::Post);
        route.response = ResponseExamples::Single(json!({"a": 1}));
        let output = render_route(&route, &config_without_tabs());
        assert!(!output.contains("Example response"));
    }

    #[test]
    fn test_only_query_table_is_rendered() {
        let mut route = RouteRecord::new("abc", "users", HttpMethod::Get);
        route.query_parameters.insert(
            "page".to_string(),
            ParameterDescriptor::new("integer", false, "Page number", json!(1)),
        );

        let output = render_route(&route, &config_without_tabs());
        assert!(output.contains(
            "#### Query Parameters\n\nParameter | Status | Description\n--------- | ------ | -----------\npage | optional | Page number"
        ));
        assert!(!output.contains("Path Parameters"));
        assert!(!output.contains("Body Parameters"));
    }

    #[test]
    fn test_body_table_with_note_row() {
        let mut route = RouteRecord::new("abc", "charges", HttpMethod::Post);
        route.body_parameters.insert(
            "amount".to_string(),
            ParameterDescriptor::new("float", true, "Amount to charge", json!(10.5)),
        );
        route.body_parameters.insert(
            "-".to_string(),
            ParameterDescriptor::new("", false, "Amounts are in dollars.", json!(null)),
        );

        let output = render_route(&route, &config_without_tabs());
        assert!(output.contains(
            "amount | float | required | Amount to charge\n| <td colspan=\"4\"> Amounts are in dollars. </td>"
        ));
    }

    #[test]
    fn test_path_table_and_code_fences() {
        let mut route = RouteRecord::new("abc", "users/{id}", HttpMethod::Get);
        route.path_parameters.insert(
            "id".to_string(),
            ParameterDescriptor::new("integer", true, "User id", json!(4)),
        );

        let output = render_route(&route, &DocConfig::default());
        assert!(output.contains("```bash\ncurl -X GET -G \"http://localhost/users/{id}\"\n```"));
        assert!(output.contains("```javascript\nconst url"));
        assert!(output.contains("id | integer | User id"));
    }

    #[test]
    fn test_default_frontmatter_and_info() {
        let config = DocConfig {
            description: "Shop API".to_string(),
            ..Default::default()
        };
        assert_eq!(
            default_frontmatter(&config),
            "title: API Reference\n\nlanguage_tabs:\n- bash\n- javascript\n\nsearch: true"
        );
        assert_eq!(
            render_info(&config),
            "# Info\n\nShop API\n\n[Get Postman Collection](collection.json)\n"
        );
    }

    #[test]
    fn test_assemble_document() {
        let parts = DocumentParts {
            frontmatter: "title: T".to_string(),
            info: "# Info\n".to_string(),
            prepend: "Intro".to_string(),
            append: "Outro".to_string(),
        };
        let groups = vec![("Users", vec!["<!-- START_1 -->\nA\n<!-- END_1 -->"])];

        let doc = assemble(&parts, groups);
        assert_eq!(
            doc,
            "---\ntitle: T\n---\n<!-- START_INFO -->\n# Info\n<!-- END_INFO -->\nIntro\n\
             \n# Users\n\n<!-- START_1 -->\nA\n<!-- END_1 -->\n\nOutro"
        );
    }
}
