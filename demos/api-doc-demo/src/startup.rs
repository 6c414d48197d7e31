//! Application wiring: versioning, documentation and routes

use crate::config::DemoConfig;
use crate::controllers::hello_world;
use apidoc_rs::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Title of the API reference page
pub const DOCS_TITLE: &str = "登灏系统API";

/// Set up logging from the configured filter; `RUST_LOG` takes precedence
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Default 1.0, reported versions, and readers tried in this order: query
/// `version`, URL segment, `X-API-Version` header, media type `version`
pub fn versioning_options() -> ApiVersioningOptions {
    ApiVersioningOptions::new()
        .default_version(ApiVersion::new(1, 0))
        .assume_default_version_when_unspecified(true)
        .report_api_versions(true)
        .reader(ApiVersionReader::combine([
            ApiVersionReader::query_string("version"),
            ApiVersionReader::url_segment(),
            ApiVersionReader::header("X-API-Version"),
            ApiVersionReader::media_type("version"),
        ]))
}

pub fn reference_config() -> ApiReferenceConfig {
    ApiReferenceConfig::new(DOCS_TITLE)
        .theme(Theme::Mars)
        .show_sidebar(true)
        .default_http_client(HttpClientTarget::csharp_httpclient())
}

/// Build the application
pub fn build_app(config: &DemoConfig) -> App {
    let app = App::new()
        .layer(TracingLayer::new().with_field("service", "api-doc-demo"))
        .openapi_info(DOCS_TITLE, Some("HelloWorld API in versions 1.0 and 2.0"))
        .api_versioning(versioning_options())
        .api_reference(reference_config());

    let app = match &config.annotations {
        Some(path) => app.annotations(path.clone()),
        None => app,
    };

    hello_world::routes(app)
}
