use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shelf_app::App;
use shelf_kernel::Settings;
use tower::ServiceExt;

async fn app() -> Router {
    App::bootstrap(Settings::default()).await.unwrap().router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create(app: &Router, title: &str, author: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/books",
        Some(json!({ "title": title, "author": author })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn root_says_hello() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Hello World!" }));
}

#[tokio::test]
async fn created_book_appears_in_listing() {
    let app = app().await;

    let created = create(&app, "T", "A").await;
    assert!(created["id"].is_i64());
    assert_eq!(created["description"], "");

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([created]));
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn get_by_id_and_missing_id() {
    let app = app().await;
    let created = create(&app, "T", "A").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    let (status, body) = send(&app, Method::GET, "/books/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found!");
}

#[tokio::test]
async fn title_lookup_wraps_results() {
    let app = app().await;
    create(&app, "Dune", "Herbert").await;
    create(&app, "Emma", "Austen").await;
    create(&app, "Dune", "Someone").await;

    let (status, body) = send(&app, Method::GET, "/books/title/Dune", None).await;
    assert_eq!(status, StatusCode::OK);
    let authors: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["author"].as_str().unwrap())
        .collect();
    assert_eq!(authors, vec!["Herbert", "Someone"]);

    let (status, body) = send(&app, Method::GET, "/books/title/dune", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "results": [] }));
}

#[tokio::test]
async fn update_round_trip_keeps_id() {
    let app = app().await;
    let created = create(&app, "T", "A").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/books",
        Some(json!({ "id": id, "title": "T2", "author": "A2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "T2");

    let (_, fetched) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(
        fetched,
        json!({ "id": id, "title": "T2", "author": "A2", "description": "" })
    );
}

#[tokio::test]
async fn update_of_missing_book_is_404() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/books",
        Some(json!({ "id": 41, "title": "T", "author": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found!");
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let app = app().await;
    let created = create(&app, "T", "A").await;
    let uri = format!("/books/{}", created["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_without_title_is_rejected() {
    let app = app().await;
    let (status, body) = send(&app, Method::POST, "/books", Some(json!({ "author": "A" }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");
    assert_eq!(body["details"][0]["field"], "title");

    let (_, listing) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(listing, json!([]));
}

#[tokio::test]
async fn description_is_stored_when_given() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "title": "T", "author": "A", "description": "first edition" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["description"], "first edition");
}

#[tokio::test]
async fn pagination_truncates_at_cursor_within_window() {
    let app = app().await;
    for _ in 0..5 {
        create(&app, "T", "A").await;
    }

    let (status, body) = send(&app, Method::GET, "/books/titles/T?cursor=3&limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![3, 4, 5]);
}

#[tokio::test]
async fn pagination_ignores_cursor_beyond_prefetched_window() {
    let app = app().await;
    for _ in 0..5 {
        create(&app, "T", "A").await;
    }

    // The window is limited to ids 1 and 2 before the cursor is searched.
    let (status, body) = send(&app, Method::GET, "/books/titles/T?cursor=3&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2]);
}

#[tokio::test]
async fn pagination_rejects_non_integer_limit() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/books/titles/T?cursor=1&limit=ten", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn pagination_rejects_non_integer_cursor() {
    let app = app().await;
    for _ in 0..3 {
        create(&app, "T", "A").await;
    }

    let (status, body) = send(&app, Method::GET, "/books/titles/T?cursor=abc&limit=3", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn pagination_requires_limit() {
    let app = app().await;
    create(&app, "T", "A").await;

    let (status, body) = send(&app, Method::GET, "/books/titles/T?cursor=1", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "limit");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books/titles/{title}"]["get"].is_object());
    assert!(body["paths"]["/books/{id}"]["delete"].is_object());
    assert!(body["components"]["schemas"]["NewBook"].is_object());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = app().await;
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
