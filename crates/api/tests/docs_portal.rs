//! Integration tests for the Swagger UI portal and its basic-auth gate.

mod common;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{Request, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cats_api::config::Environment;
use common::{body_json, get, DOCS_PASSWORD};
use tower::ServiceExt;

async fn get_basic(app: axum::Router, uri: &str, credentials: &str) -> axum::response::Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Basic {}", STANDARD.encode(credentials)))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_docs_challenge_without_credentials() {
    let (app, _) = common::build_test_app();

    for uri in ["/docs-json", "/docs/"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"docs\""
        );
    }
}

#[tokio::test]
async fn test_docs_wrong_credentials() {
    let (app, _) = common::build_test_app();
    let response = get_basic(app.clone(), "/docs-json", "gatico:wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_basic(app, "/docs-json", &format!("admin:{DOCS_PASSWORD}")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_docs_json_with_credentials() {
    let (app, _) = common::build_test_app();
    let response = get_basic(app, "/docs-json", &format!("gatico:{DOCS_PASSWORD}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["info"]["title"], "Cats Management API");
    assert_eq!(json["info"]["version"], "1.0.0");
    assert!(json["paths"]["/v1/auth/login"]["post"].is_object());
    assert!(json["components"]["securitySchemes"]["bearer"].is_object());
}

#[tokio::test]
async fn test_docs_open_in_development() {
    let mut config = common::test_config();
    config.environment = Environment::Development;
    config.docs.password = None;
    let (app, _) = common::build_test_app_with(config);

    let response = get(app, "/docs-json").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_docs_path_is_configurable() {
    let mut config = common::test_config();
    config.environment = Environment::Development;
    config.docs.path = "/api-docs".to_string();
    let (app, _) = common::build_test_app_with(config);

    let response = get(app.clone(), "/api-docs-json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get(app, "/docs-json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
