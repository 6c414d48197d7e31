//! Scalar API reference HTML generation

use crate::config::ApiReferenceConfig;
use serde_json::json;

const SCALAR_CDN: &str = "https://cdn.jsdelivr.net/npm/@scalar/api-reference";

/// Generate the API reference page for the given group documents
///
/// Each group becomes one selectable source, titled with its group name.
pub fn generate_reference_html(config: &ApiReferenceConfig, groups: &[String]) -> String {
    let sources: Vec<_> = groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            json!({
                "title": group,
                "slug": group,
                "url": config.document_url(group),
                "default": i == 0,
            })
        })
        .collect();

    let configuration = json!({
        "theme": config.theme,
        "showSidebar": config.show_sidebar,
        "defaultHttpClient": config.default_http_client,
        "sources": sources,
    });

    let mut html = String::with_capacity(1024);
    html.push_str(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>"#,
    );
    html.push_str(&escape_html(&config.title));
    html.push_str(
        r#"</title>
</head>
<body>
    <div id="app"></div>
    <script src=""#,
    );
    html.push_str(SCALAR_CDN);
    html.push_str(
        r#""></script>
    <script>
        Scalar.createApiReference('#app', "#,
    );
    html.push_str(&script_safe_json(&configuration));
    html.push_str(
        r#");
    </script>
</body>
</html>"#,
    );

    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON that cannot close the surrounding `<script>` element
fn script_safe_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}
