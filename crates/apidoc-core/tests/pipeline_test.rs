//! Routing, body limits, layers and documentation endpoints

use apidoc_core::apidoc_openapi::versioning::{ApiVersion, ApiVersionReader, ApiVersioningOptions};
use apidoc_core::apidoc_openapi::{ApiReferenceConfig, Operation, Theme};
use apidoc_core::{
    get, post, App, Headers, Json, Query, State, TestClient, TestRequest, TracingLayer,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Greeting {
    name: String,
}

#[derive(Deserialize)]
struct Paging {
    page: Option<u32>,
}

#[derive(Clone)]
struct Prefix(&'static str);

async fn hello() -> &'static str {
    "hello"
}

async fn greet(State(prefix): State<Prefix>, Json(body): Json<Greeting>) -> Json<Greeting> {
    Json(Greeting {
        name: format!("{}{}", prefix.0, body.name),
    })
}

async fn paging(Query(paging): Query<Paging>, headers: Headers) -> String {
    format!(
        "page={} agent={}",
        paging.page.unwrap_or(1),
        headers.get("user-agent").unwrap_or("none")
    )
}

#[tokio::test]
async fn test_not_found() {
    let client = TestClient::new(App::new().route("/", get(hello)));
    let response = client.get("/missing").await;
    response.assert_status(404);

    let body: Value = response.json().unwrap();
    assert_eq!(body["error"]["type"], "not_found");
}

#[tokio::test]
async fn test_method_not_allowed_lists_methods() {
    let client = TestClient::new(App::new().route("/", get(hello)));
    let response = client.request(TestRequest::delete("/")).await;
    response.assert_status(405).assert_header("allow", "GET");
}

#[tokio::test]
async fn test_body_limit() {
    let app = App::new().body_limit(16).route(
        "/greet",
        post(greet),
    );
    let client = TestClient::new(app.state(Prefix("Hi ")));

    let response = client
        .request(TestRequest::post("/greet").body("x".repeat(64)))
        .await;
    response.assert_status(413);
}

#[tokio::test]
async fn test_state_and_json_extractors() {
    let app = App::new().state(Prefix("Hi ")).route("/greet", post(greet));
    let client = TestClient::new(app);

    client
        .post_json("/greet", &Greeting { name: "Ada".to_string() })
        .await
        .assert_status(200)
        .assert_header("content-type", "application/json")
        .assert_json(&Greeting {
            name: "Hi Ada".to_string(),
        });
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let app = App::new().state(Prefix("")).route("/greet", post(greet));
    let response = TestClient::new(app)
        .request(TestRequest::post("/greet").body("{ nope"))
        .await;
    response.assert_status(400);
}

#[tokio::test]
async fn test_query_and_headers_extractors() {
    let client = TestClient::new(App::new().route("/items", get(paging)));
    let response = client
        .request(TestRequest::get("/items?page=3").header("User-Agent", "tests"))
        .await;
    response.assert_status(200);
    assert_eq!(response.text(), "page=3 agent=tests");
}

#[tokio::test]
async fn test_tracing_layer_passes_response_through() {
    let app = App::new()
        .layer(TracingLayer::new().with_field("service", "pipeline-test"))
        .route("/", get(hello));

    let response = TestClient::new(app).get("/").await;
    response.assert_status(200);
    assert_eq!(response.text(), "hello");
}

fn documented_app() -> App {
    App::new()
        .without_annotations()
        .openapi_info("Users API", Some("Versioned users"))
        .api_versioning(
            ApiVersioningOptions::new()
                .assume_default_version_when_unspecified(true)
                .reader(ApiVersionReader::combine([
                    ApiVersionReader::query_string("version"),
                    ApiVersionReader::url_segment(),
                    ApiVersionReader::header("X-API-Version"),
                ])),
        )
        .versioned_route(
            "/api/users",
            ApiVersion::v1(),
            get(hello).operation(Operation::new().operation_id("GetUsers")),
        )
        .versioned_route(
            "/api/{version}/users",
            ApiVersion::v1(),
            get(hello).operation(Operation::new().operation_id("GetUsers")),
        )
        .versioned_route(
            "/api/{version}/users",
            ApiVersion::v2(),
            get(hello).operation(Operation::new().operation_id("GetUsersV2")),
        )
        .api_reference(
            ApiReferenceConfig::new("Users <API>")
                .theme(Theme::Mars)
                .show_sidebar(true),
        )
}

#[tokio::test]
async fn test_reference_page_served() {
    let response = TestClient::new(documented_app()).get("/help").await;
    response
        .assert_status(200)
        .assert_header("content-type", "text/html; charset=utf-8")
        .assert_body_contains("<title>Users &lt;API&gt;</title>")
        .assert_body_contains("/openapi/v1.json")
        .assert_body_contains("/openapi/v2.json");
}

#[tokio::test]
async fn test_group_documents_served() {
    let client = TestClient::new(documented_app());

    let response = client.get("/openapi/v1.json").await;
    response
        .assert_status(200)
        .assert_header("content-type", "application/json");
    let doc: Value = response.json().unwrap();
    assert_eq!(doc["openapi"], "3.0.3");
    assert_eq!(doc["info"]["title"], "Users API");
    assert_eq!(doc["info"]["version"], "1.0");
    assert_eq!(doc["paths"]["/api/v1/users"]["get"]["operationId"], "GetUsers");
    assert_eq!(doc["paths"]["/api/users"]["get"]["operationId"], "GetUsers_2");

    let params = doc["paths"]["/api/users"]["get"]["parameters"]
        .as_array()
        .unwrap();
    let names: Vec<_> = params.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["version", "X-API-Version"]);

    let doc: Value = client.get("/openapi/v2.json").await.json().unwrap();
    assert_eq!(doc["paths"]["/api/v2/users"]["get"]["operationId"], "GetUsersV2");
    assert!(doc["paths"].get("/api/users").is_none());
}

#[tokio::test]
async fn test_unknown_group_document_is_not_found() {
    let client = TestClient::new(documented_app());
    client.get("/openapi/v9.json").await.assert_status(404);
    client.get("/openapi/v1.yaml").await.assert_status(404);
}

#[tokio::test]
async fn test_no_reference_without_configuration() {
    let app = App::new().route("/", get(hello));
    TestClient::new(app).get("/help").await.assert_status(404);
}

#[tokio::test]
async fn test_missing_annotation_file_is_ignored() {
    let app = documented_app().annotations(
        std::env::temp_dir().join("apidoc-core-missing.annotations.json"),
    );
    TestClient::new(app)
        .get("/openapi/v1.json")
        .await
        .assert_status(200);
}

#[test]
#[should_panic(expected = "ROUTE CONFLICT DETECTED")]
fn test_route_conflict_panics() {
    let _ = App::new()
        .route("/users/{id}", get(hello))
        .route("/users/{name}", get(hello));
}
