//! Version dispatch through the full request pipeline

use apidoc_core::apidoc_openapi::versioning::{
    ApiVersion, ApiVersionReader, ApiVersioningOptions,
};
use apidoc_core::apidoc_openapi::Operation;
use apidoc_core::{get, App, RequestedApiVersion, TestClient, TestRequest};
use serde_json::{json, Value};

async fn users_v1() -> &'static str {
    "users v1"
}

async fn users_v2() -> &'static str {
    "users v2"
}

async fn echo_version(version: RequestedApiVersion) -> String {
    format!("{} from {}", version.version(), version.source())
}

fn options() -> ApiVersioningOptions {
    ApiVersioningOptions::new()
        .default_version(ApiVersion::v1())
        .assume_default_version_when_unspecified(true)
        .report_api_versions(true)
        .reader(ApiVersionReader::combine([
            ApiVersionReader::query_string("version"),
            ApiVersionReader::url_segment(),
            ApiVersionReader::header("X-API-Version"),
            ApiVersionReader::media_type("version"),
        ]))
}

fn client() -> TestClient {
    let app = App::new()
        .without_annotations()
        .api_versioning(options())
        .versioned_route("/api/users", ApiVersion::v1(), get(users_v1))
        .versioned_route("/api/users", ApiVersion::v2(), get(users_v2))
        .versioned_route("/api/{version}/users", ApiVersion::v1(), get(users_v1))
        .versioned_route("/api/{version}/users", ApiVersion::v2(), get(users_v2));
    TestClient::new(app)
}

#[tokio::test]
async fn test_default_version_when_unspecified() {
    let response = client().get("/api/users").await;
    response.assert_status(200);
    assert_eq!(response.text(), "users v1");
}

#[tokio::test]
async fn test_every_reader_selects_the_version() {
    let client = client();

    client
        .get("/api/users?version=2.0")
        .await
        .assert_status(200)
        .assert_body_contains("users v2");

    client
        .get("/api/v2.0/users")
        .await
        .assert_status(200)
        .assert_body_contains("users v2");

    client
        .get("/api/2/users")
        .await
        .assert_status(200)
        .assert_body_contains("users v2");

    client
        .request(TestRequest::get("/api/users").header("X-API-Version", "2.0"))
        .await
        .assert_status(200)
        .assert_body_contains("users v2");

    client
        .request(TestRequest::get("/api/users").header("Accept", "application/json; version=2.0"))
        .await
        .assert_status(200)
        .assert_body_contains("users v2");
}

#[tokio::test]
async fn test_query_reader_wins_over_header() {
    let response = client()
        .request(TestRequest::get("/api/users?version=1.0").header("X-API-Version", "2.0"))
        .await;
    response.assert_status(200);
    assert_eq!(response.text(), "users v1");
}

#[tokio::test]
async fn test_unsupported_version_is_rejected() {
    let response = client().get("/api/users?version=3.0").await;
    response.assert_status(400);

    let body: Value = response.json().unwrap();
    assert_eq!(body["error"]["type"], "unsupported_api_version");
    response.assert_header("api-supported-versions", "1.0, 2.0");
}

#[tokio::test]
async fn test_malformed_version_is_rejected() {
    let response = client().get("/api/users?version=abc").await;
    response.assert_status(400);

    let body: Value = response.json().unwrap();
    assert_eq!(body["error"]["type"], "invalid_api_version");
}

#[tokio::test]
async fn test_non_version_segment_is_not_found() {
    let client = client();

    for path in ["/api/foo/users", "/api/foo/users?version=1.0"] {
        let response = client.get(path).await;
        response.assert_status(404);
        let body: Value = response.json().unwrap();
        assert_eq!(body["error"]["type"], "not_found");
        assert!(response.header("api-supported-versions").is_none());
    }
}

#[tokio::test]
async fn test_unspecified_version_without_default() {
    let app = App::new()
        .without_annotations()
        .api_versioning(options().assume_default_version_when_unspecified(false))
        .versioned_route("/api/users", ApiVersion::v1(), get(users_v1));

    let response = TestClient::new(app).get("/api/users").await;
    response.assert_status(400);
    let body: Value = response.json().unwrap();
    assert_eq!(body["error"]["type"], "api_version_unspecified");
}

#[tokio::test]
async fn test_supported_versions_reported() {
    let response = client().get("/api/users").await;
    response.assert_header("api-supported-versions", "1.0, 2.0");
    assert!(response.header("api-deprecated-versions").is_none());
}

#[tokio::test]
async fn test_reporting_can_be_disabled() {
    let app = App::new()
        .without_annotations()
        .api_versioning(options().report_api_versions(false))
        .versioned_route("/api/users", ApiVersion::v1(), get(users_v1));

    let response = TestClient::new(app).get("/api/users").await;
    response.assert_status(200);
    assert!(response.header("api-supported-versions").is_none());
}

#[tokio::test]
async fn test_deprecated_version_reported_separately() {
    let app = App::new()
        .without_annotations()
        .api_versioning(options())
        .versioned_route(
            "/api/users",
            ApiVersion::v1(),
            get(users_v1).operation(Operation::new().deprecated()),
        )
        .versioned_route("/api/users", ApiVersion::v2(), get(users_v2));

    let response = TestClient::new(app).get("/api/users").await;
    response
        .assert_status(200)
        .assert_header("api-supported-versions", "2.0")
        .assert_header("api-deprecated-versions", "1.0");
}

#[tokio::test]
async fn test_handler_sees_resolved_version() {
    let app = App::new()
        .without_annotations()
        .api_versioning(options())
        .versioned_route("/api/{version}/echo", ApiVersion::new(1, 5), get(echo_version));

    let response = TestClient::new(app).get("/api/v1.5/echo").await;
    response.assert_status(200);
    assert_eq!(response.text(), "1.5 from URL segment");
}

#[tokio::test]
async fn test_neutral_route_ignores_version() {
    let app = App::new()
        .without_annotations()
        .api_versioning(options())
        .route("/health", get(users_v1));

    let response = TestClient::new(app).get("/health?version=abc").await;
    response.assert_status(200);
    assert!(response.header("api-supported-versions").is_none());
}

#[tokio::test]
async fn test_error_envelope_shape() {
    let response = client().get("/api/users?version=9.9").await;
    let body: Value = response.json().unwrap();
    assert_eq!(
        body["error"]["message"],
        json!("the requested API version '9.9' is not supported")
    );
}
