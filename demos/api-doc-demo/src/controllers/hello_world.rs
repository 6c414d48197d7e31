//! HelloWorld controller, in versions 1.0 and 2.0
//!
//! Both versions answer on the unversioned path, where a reader picks the
//! version, and on the path carrying the version as a URL segment.

use apidoc_rs::prelude::*;

/// Unversioned path; version from query, header or media type
pub const PATH: &str = "/api/HelloWorld";

/// Path with the version as a URL segment (`/api/v2.0/HelloWorld`)
pub const VERSIONED_PATH: &str = "/api/{version}/HelloWorld";

const TAG: &str = "HelloWorld";

/// User record returned by version 1.0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Schema)]
pub struct UserV1 {
    pub id: i32,
    pub name: String,
}

/// User record returned by version 2.0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Schema)]
pub struct UserV2 {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// 获取用户列表（版本1.0）
pub async fn get_users() -> Json<Vec<UserV1>> {
    Json(vec![UserV1 {
        id: 1,
        name: "John Doe".to_string(),
    }])
}

/// 获取用户列表（版本2.0）
pub async fn get_users_v2() -> Json<Vec<UserV2>> {
    Json(vec![UserV2 {
        id: 1,
        name: "John Doe".to_string(),
        email: "john.doe@example.com".to_string(),
    }])
}

// The 400 is documented for clients; no handler path produces it.
fn get_users_operation() -> Operation {
    Operation::new()
        .operation_id("GetUsers")
        .summary("获取用户列表（版本1.0）")
        .description("示例请求：\n\n    GET /api/v1.0/HelloWorld")
        .tag(TAG)
        .json_array_response::<UserV1>(200, "返回用户列表")
        .bad_request_response("Bad Request")
}

fn get_users_v2_operation() -> Operation {
    Operation::new()
        .operation_id("GetUsersV2")
        .summary("获取用户列表（版本2.0）")
        .description("示例请求：\n\n    GET /api/v2.0/HelloWorld")
        .tag(TAG)
        .json_array_response::<UserV2>(200, "返回包含邮箱的用户列表")
        .bad_request_response("Bad Request")
}

/// Register every HelloWorld route
pub fn routes(app: App) -> App {
    [PATH, VERSIONED_PATH].into_iter().fold(app, |app, path| {
        app.versioned_route(
            path,
            ApiVersion::v1(),
            get(get_users).operation(get_users_operation()),
        )
        .versioned_route(
            path,
            ApiVersion::v2(),
            get(get_users_v2).operation(get_users_v2_operation()),
        )
    })
}
