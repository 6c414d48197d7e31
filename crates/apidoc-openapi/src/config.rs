//! API reference configuration

use serde::Serialize;

/// Color theme of the API reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    Default,
    Alternate,
    Moon,
    Purple,
    Solarized,
    BluePlanet,
    Saturn,
    Kepler,
    Mars,
    DeepSpace,
    None,
}

/// Client code sample preselected in the API reference
///
/// `target` is the language (`csharp`, `shell`, `python`...) and `client`
/// the library within it (`httpclient`, `curl`, `requests`...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpClientTarget {
    #[serde(rename = "targetKey")]
    pub target: String,
    #[serde(rename = "clientKey")]
    pub client: String,
}

impl HttpClientTarget {
    /// Create a target/client pair
    pub fn new(target: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            client: client.into(),
        }
    }

    /// C# `HttpClient`
    pub fn csharp_httpclient() -> Self {
        Self::new("csharp", "httpclient")
    }

    /// Shell `curl`
    pub fn shell_curl() -> Self {
        Self::new("shell", "curl")
    }
}

impl Default for HttpClientTarget {
    fn default() -> Self {
        Self::shell_curl()
    }
}

/// Configuration for the interactive API reference
#[derive(Debug, Clone)]
pub struct ApiReferenceConfig {
    /// Page title
    pub title: String,
    /// Color theme
    pub theme: Theme,
    /// Whether the navigation sidebar is shown
    pub show_sidebar: bool,
    /// Preselected client code sample
    pub default_http_client: HttpClientTarget,
    /// Path the reference page is served at
    pub path: String,
    /// Path template of the OpenAPI documents; `{documentName}` is replaced
    /// by the group name
    pub document_path: String,
}

impl Default for ApiReferenceConfig {
    fn default() -> Self {
        Self {
            title: "API Reference".to_string(),
            theme: Theme::Default,
            show_sidebar: true,
            default_http_client: HttpClientTarget::default(),
            path: "/help".to_string(),
            document_path: "/openapi/{documentName}.json".to_string(),
        }
    }
}

impl ApiReferenceConfig {
    /// Create a configuration with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the theme
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Show or hide the sidebar
    pub fn show_sidebar(mut self, show: bool) -> Self {
        self.show_sidebar = show;
        self
    }

    /// Set the preselected client code sample
    pub fn default_http_client(mut self, client: HttpClientTarget) -> Self {
        self.default_http_client = client;
        self
    }

    /// Set the path of the reference page
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the document path template
    pub fn document_path(mut self, template: impl Into<String>) -> Self {
        self.document_path = template.into();
        self
    }

    /// Path of one group document
    pub fn document_url(&self, group: &str) -> String {
        self.document_path.replace("{documentName}", group)
    }

    /// Route template serving the group documents, e.g. `/openapi/{group}.json`
    ///
    /// The router only captures whole segments, so the template must keep
    /// `{documentName}` as the leading part of its last segment.
    pub fn document_route(&self) -> Option<(String, String)> {
        let (prefix, last) = self.document_path.rsplit_once('/')?;
        let suffix = last.strip_prefix("{documentName}")?;
        Some((format!("{}/{{document}}", prefix), suffix.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url() {
        let config = ApiReferenceConfig::new("Docs");
        assert_eq!(config.document_url("v2"), "/openapi/v2.json");
    }

    #[test]
    fn test_document_route() {
        let config = ApiReferenceConfig::new("Docs");
        assert_eq!(
            config.document_route(),
            Some(("/openapi/{document}".to_string(), ".json".to_string()))
        );

        let config = config.document_path("/openapi/docs-{documentName}");
        assert_eq!(config.document_route(), None);
    }

    #[test]
    fn test_theme_serialization() {
        assert_eq!(serde_json::to_value(Theme::Mars).unwrap(), "mars");
        assert_eq!(serde_json::to_value(Theme::DeepSpace).unwrap(), "deepSpace");
    }

    #[test]
    fn test_http_client_serialization() {
        let json = serde_json::to_value(HttpClientTarget::csharp_httpclient()).unwrap();
        assert_eq!(json["targetKey"], "csharp");
        assert_eq!(json["clientKey"], "httpclient");
    }
}
