//! Relation routes driven end to end through the router

use admin_http::{admin_router, seed_repositories, AdminConfig, AdminState};
use admin_relations::ResourceCatalog;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::io::Write;
use tower::ServiceExt;
use tracing_test::traced_test;

const CATALOG: &str = r#"
resources:
  - name: posts
    relations:
      - { name: items, type: OneToMany, field: Items, resource_name: items }
      - { name: tags, type: ManyToMany, field: Tags }
      - { name: Owner, type: ManyToOne, resource_name: users, required: true }
      - { name: profile, type: OneToOne, field: Profile }
      - { name: title, type: OneToOne, field: Title }
      - { name: revisions, type: Polymorphic, field: Revisions }
      - { name: comments, type: OneToMany, field: Comments }
      - { name: headline, type: ManyToMany, field: Title }
      - { name: labels, type: ManyToMany, field: Tags, resource_name: labels }
    fixtures:
      - { ID: 1, Title: Hello, Items: [], Tags: [1], OwnerID: 0, Profile: { ID: 8 }, Revisions: [] }
  - name: items
    fixtures:
      - { ID: 10, Name: first }
      - { ID: 20, Name: second }
  - name: users
    fixtures:
      - { ID: 5, Name: ada }
"#;

fn app() -> Router {
    let catalog = ResourceCatalog::from_yaml(CATALOG).unwrap();
    let repositories = seed_repositories(&catalog).unwrap();
    admin_router(AdminState::new(catalog, repositories), &AdminConfig::testing())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_attach_detach_and_list_one_to_many() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/posts/1/relations/items/attach",
        Some(json!({"ids": [10, 20]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["message"].as_str().unwrap().starts_with("Attached 2 item(s)"));

    let (status, body) = send(&app, Method::GET, "/api/posts/1/relations/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": [{"ID": 10, "Name": "first"}, {"ID": 20, "Name": "second"}]})
    );

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/posts/1/relations/items/detach",
        Some(json!({"ids": [10.0]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/posts/1/relations/items/list", None).await;
    assert_eq!(body, json!({"data": [{"ID": 20, "Name": "second"}]}));
}

#[tokio::test]
async fn test_many_to_one_resolves_and_clears() {
    let app = app();

    let (_, body) = send(&app, Method::GET, "/api/posts/1/relations/Owner", None).await;
    assert_eq!(body, json!({"data": null}));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/posts/1/relations/Owner/attach",
        Some(json!({"ids": [5]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/posts/1/relations/Owner", None).await;
    assert_eq!(body, json!({"data": {"ID": 5, "Name": "ada"}}));

    send(
        &app,
        Method::POST,
        "/api/posts/1/relations/Owner/detach",
        Some(json!({"ids": [123]})),
    )
    .await;
    let (_, body) = send(&app, Method::GET, "/api/posts/1/relations/Owner", None).await;
    assert_eq!(body, json!({"data": null}));
}

#[tokio::test]
async fn test_many_to_many_attach_is_deduplicated() {
    let app = app();

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/posts/1/relations/tags/attach",
            Some(json!({"ids": [1, 2]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, Method::GET, "/api/posts/1/relations/tags", None).await;
    assert_eq!(body, json!({"data": [1, 2]}));
}

#[tokio::test]
async fn test_one_to_one_list_and_detach() {
    let app = app();

    let (_, body) = send(&app, Method::GET, "/api/posts/1/relations/profile", None).await;
    assert_eq!(body, json!({"data": {"ID": 8}}));

    send(
        &app,
        Method::POST,
        "/api/posts/1/relations/profile/detach",
        Some(json!({"ids": [8]})),
    )
    .await;
    let (_, body) = send(&app, Method::GET, "/api/posts/1/relations/profile", None).await;
    assert_eq!(body, json!({"data": null}));
}

#[tokio::test]
async fn test_many_to_many_does_not_need_a_target_repository() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/posts/1/relations/labels/attach",
        Some(json!({"ids": [4]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/posts/1/relations/labels", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": [1, 4]}));
}

#[tokio::test]
async fn test_client_errors_map_to_400() {
    let app = app();

    let cases = [
        ("/api/posts/1/relations/items/attach", Some(json!({"ids": []})), "EMPTY_OPERAND"),
        ("/api/posts/1/relations/items/attach", None, "EMPTY_OPERAND"),
        ("/api/posts/1/relations/items/attach", Some(json!({"ids": 10})), "INVALID_PAYLOAD"),
        ("/api/posts/1/relations/likes/attach", Some(json!({"ids": [1]})), "RELATION_NOT_FOUND"),
        ("/api/posts/1/relations/revisions/attach", Some(json!({"ids": [1]})), "UNSUPPORTED_RELATION_TYPE"),
        ("/api/posts/1/relations/comments/detach", Some(json!({"ids": [1]})), "FIELD_NOT_FOUND"),
        ("/api/posts/1/relations/headline/attach", Some(json!({"ids": [1]})), "NOT_A_SEQUENCE"),
        ("/api/posts/1/relations/title/detach", Some(json!({"ids": [1]})), "FIELD_UNSETTABLE"),
    ];

    for (uri, payload, code) in cases {
        let (status, body) = send(&app, Method::POST, uri, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!(code), "{}", uri);
    }
}

#[tokio::test]
async fn test_missing_records_map_to_404() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/posts/1/relations/items/attach",
        Some(json!({"ids": [99]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("RECORD_NOT_FOUND"));

    let (status, _) = send(&app, Method::GET, "/api/posts/7/relations/items", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/api/comments/1/relations/items", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("RESOURCE_NOT_FOUND"));

    let (status, body) = send(&app, Method::POST, "/api/posts/1/relations/items/merge", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("ACTION_NOT_FOUND"));
}

#[tokio::test]
async fn test_malformed_body_to_unknown_target_is_404() {
    let app = app();

    for (uri, code) in [
        ("/api/comments/1/relations/items/attach", "RESOURCE_NOT_FOUND"),
        ("/api/posts/1/relations/items/merge", "ACTION_NOT_FOUND"),
    ] {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], json!(code), "{}", uri);
    }
}

#[tokio::test]
async fn test_verb_mismatch_is_405() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/posts/1/relations/items/attach", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["code"], json!("METHOD_NOT_ALLOWED"));

    let (status, _) = send(&app, Method::DELETE, "/api/posts/1/relations/items/list", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_failed_attach_leaves_parent_untouched() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/posts/1/relations/items/attach",
        Some(json!({"ids": [10, 99]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/posts/1/relations/items", None).await;
    assert_eq!(body, json!({"data": []}));
}

#[tokio::test]
async fn test_custom_prefix_and_health() {
    let catalog = ResourceCatalog::from_yaml(CATALOG).unwrap();
    let repositories = seed_repositories(&catalog).unwrap();
    let config = AdminConfig::testing().with_api_prefix("/admin");
    let app = admin_router(AdminState::new(catalog, repositories), &config);

    let (status, _) = send(&app, Method::GET, "/admin/posts/1/relations/tags", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/posts/1/relations/tags", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["resources"], json!(3));
}

#[tokio::test]
async fn test_catalog_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();

    let config = AdminConfig::testing().with_resources_path(file.path());
    let catalog = ResourceCatalog::load(config.resources_path.as_ref().unwrap()).unwrap();
    let repositories = seed_repositories(&catalog).unwrap();
    let app = admin_router(AdminState::new(catalog, repositories), &config);

    let (status, body) = send(&app, Method::GET, "/api/posts/1/relations/tags", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": [1]}));
}

#[tokio::test]
#[traced_test]
async fn test_commit_is_logged() {
    let app = app();

    send(
        &app,
        Method::POST,
        "/api/posts/1/relations/tags/attach",
        Some(json!({"ids": [3]})),
    )
    .await;

    assert!(logs_contain("relation change committed"));
}
