use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashSet;

use clear::auth::{AuthMiddleware, TokenService};
use clear::error::AppError;
use clear::{db, messages, routes};

const TEST_SECRET: &str = "integration-test-secret";

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory sqlite");
    db::init_schema(&pool).await.expect("failed to create schema");
    pool
}

macro_rules! init_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(TokenService::new(TEST_SECRET, 24)))
                .app_data(web::JsonConfig::default().error_handler(|_err, _req| {
                    AppError::BadRequest(messages::INVALID_REQUEST_BODY.into()).into()
                }))
                .app_data(web::QueryConfig::default().error_handler(|_err, _req| {
                    AppError::BadRequest(messages::INVALID_REQUEST_BODY.into()).into()
                }))
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

/// Registers a user and returns their session token.
macro_rules! register_user {
    ($app:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/user/register")
            .set_json(json!({ "username": $username, "password": "Password123!" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }};
}

/// Creates a todo and returns the created record.
macro_rules! create_todo {
    ($app:expr, $token:expr, $payload:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/todo")
            .append_header(("Authorization", format!("Bearer {}", $token)))
            .set_json($payload)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(status, StatusCode::CREATED, "create todo failed: {}", body);
        body["data"].clone()
    }};
}

/// Fetches one page of todos and returns the `data` object.
macro_rules! fetch_page {
    ($app:expr, $token:expr, $query:expr) => {{
        let req = test::TestRequest::get()
            .uri(&format!("/api/todo{}", $query))
            .append_header(("Authorization", format!("Bearer {}", $token)))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(status, StatusCode::OK, "page query failed: {}", body);
        body["data"].clone()
    }};
}

fn item_ids(page: &serde_json::Value) -> HashSet<String> {
    page["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[actix_rt::test]
async fn test_pagination_window_and_total() {
    let pool = test_pool().await;
    let app = init_app!(pool);
    let token = register_user!(app, "paging_user");

    for i in 0..5 {
        create_todo!(
            app,
            token,
            json!({ "title": format!("todo {}", i), "content": "some content" })
        );
    }

    let first = fetch_page!(app, token, "?page=1&pageSize=3");
    assert_eq!(first["total"], 5);
    assert_eq!(first["page"], 1);
    assert_eq!(first["pageSize"], 3);
    assert_eq!(first["items"].as_array().unwrap().len(), 3);

    let second = fetch_page!(app, token, "?page=2&pageSize=3");
    assert_eq!(second["total"], 5);
    assert_eq!(second["items"].as_array().unwrap().len(), 2);

    // The two windows cover all five todos with no overlap.
    let first_ids = item_ids(&first);
    let second_ids = item_ids(&second);
    assert!(first_ids.is_disjoint(&second_ids));
    assert_eq!(first_ids.union(&second_ids).count(), 5);

    // Pagination is deterministic across repeated calls.
    let first_again = fetch_page!(app, token, "?page=1&pageSize=3");
    assert_eq!(item_ids(&first_again), first_ids);
}

#[actix_rt::test]
async fn test_page_size_normalization() {
    let pool = test_pool().await;
    let app = init_app!(pool);
    let token = register_user!(app, "clamp_user");

    create_todo!(app, token, json!({ "title": "only", "content": "todo" }));

    // Oversized page size clamps to the maximum rather than erroring.
    let page = fetch_page!(app, token, "?pageSize=500");
    assert_eq!(page["pageSize"], 100);
    assert_eq!(page["total"], 1);

    // Non-positive page size falls back to the default of 3.
    let page = fetch_page!(app, token, "?pageSize=0");
    assert_eq!(page["pageSize"], 3);

    // No parameters at all: first page, default size.
    let page = fetch_page!(app, token, "");
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 3);
}

#[actix_rt::test]
async fn test_ownership_isolation() {
    let pool = test_pool().await;
    let app = init_app!(pool);
    let alice = register_user!(app, "alice");
    let bob = register_user!(app, "bob");

    create_todo!(app, alice, json!({ "title": "alice 1", "content": "c" }));
    create_todo!(app, alice, json!({ "title": "alice 2", "content": "c" }));
    let bob_todo = create_todo!(app, bob, json!({ "title": "bob 1", "content": "c" }));

    let alice_page = fetch_page!(app, alice, "?pageSize=100");
    assert_eq!(alice_page["total"], 2);
    let bob_page = fetch_page!(app, bob, "?pageSize=100");
    assert_eq!(bob_page["total"], 1);

    // Bob's todo never shows up in Alice's pages and vice versa.
    let alice_ids = item_ids(&alice_page);
    assert!(!alice_ids.contains(bob_todo["id"].as_str().unwrap()));
    for item in bob_page["items"].as_array().unwrap() {
        assert_eq!(item["title"], "bob 1");
    }
}

#[actix_rt::test]
async fn test_status_counts_and_filter() {
    let pool = test_pool().await;
    let app = init_app!(pool);
    let token = register_user!(app, "status_user");

    let mut created = Vec::new();
    for i in 0..3 {
        created.push(create_todo!(
            app,
            token,
            json!({ "title": format!("todo {}", i), "content": "c" })
        ));
    }

    // Flip the first todo to completed.
    let first = &created[0];
    let req = test::TestRequest::put()
        .uri(&format!("/api/todo/{}", first["id"].as_str().unwrap()))
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({
            "title": first["title"],
            "content": first["content"],
            "status": 1,
            "categoryId": first["categoryId"],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Status endpoint counts only this user's todos by status.
    let req = test::TestRequest::get()
        .uri("/api/user/status")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["pending"], 2);
    assert_eq!(body["data"]["completed"], 1);

    // The status filter matches the flipped todo only.
    let completed_page = fetch_page!(app, token, "?status=1");
    assert_eq!(completed_page["total"], 1);
    assert_eq!(
        completed_page["items"][0]["id"].as_str(),
        first["id"].as_str()
    );

    let pending_page = fetch_page!(app, token, "?status=0");
    assert_eq!(pending_page["total"], 2);
}

#[actix_rt::test]
async fn test_category_lifecycle() {
    let pool = test_pool().await;
    let app = init_app!(pool);
    let token = register_user!(app, "category_user");

    // Registration seeds the default category.
    let req = test::TestRequest::get()
        .uri("/api/category")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let categories = body["data"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["name"], "Default");

    // Create a second category.
    let req = test::TestRequest::post()
        .uri("/api/category")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "name": "Work" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let work_id = body["data"]["id"].as_str().unwrap().to_string();

    // Todos can target it, and the category filter sees only them.
    create_todo!(
        app,
        token,
        json!({ "title": "report", "content": "c", "categoryId": work_id })
    );
    create_todo!(app, token, json!({ "title": "chores", "content": "c" }));

    let work_page = fetch_page!(app, token, &format!("?categoryId={}", work_id));
    assert_eq!(work_page["total"], 1);
    assert_eq!(work_page["items"][0]["title"], "report");

    // Rename, then delete.
    let req = test::TestRequest::put()
        .uri(&format!("/api/category/{}", work_id))
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "name": "Office" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/category/{}", work_id))
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Deleting again reports not found.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/category/{}", work_id))
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_cross_user_mutations_report_not_found() {
    let pool = test_pool().await;
    let app = init_app!(pool);
    let alice = register_user!(app, "alice_owner");
    let bob = register_user!(app, "bob_intruder");

    let alice_todo = create_todo!(app, alice, json!({ "title": "private", "content": "c" }));
    let alice_todo_id = alice_todo["id"].as_str().unwrap();
    let alice_category_id = alice_todo["categoryId"].as_str().unwrap();

    // Bob needs his own category id for a well-formed update payload.
    let req = test::TestRequest::get()
        .uri("/api/category")
        .append_header(("Authorization", format!("Bearer {}", bob)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let bob_category_id = body["data"][0]["id"].as_str().unwrap().to_string();

    // Updating or deleting Alice's todo as Bob reports not found.
    let req = test::TestRequest::put()
        .uri(&format!("/api/todo/{}", alice_todo_id))
        .append_header(("Authorization", format!("Bearer {}", bob)))
        .set_json(json!({
            "title": "hijacked",
            "content": "c",
            "status": 1,
            "categoryId": bob_category_id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/todo/{}", alice_todo_id))
        .append_header(("Authorization", format!("Bearer {}", bob)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Same for Alice's category.
    let req = test::TestRequest::put()
        .uri(&format!("/api/category/{}", alice_category_id))
        .append_header(("Authorization", format!("Bearer {}", bob)))
        .set_json(json!({ "name": "stolen" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Alice's data is untouched.
    let page = fetch_page!(app, alice, "");
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "private");
    assert_eq!(page["items"][0]["status"], 0);
}

#[actix_rt::test]
async fn test_create_todo_validation() {
    let pool = test_pool().await;
    let app = init_app!(pool);
    let token = register_user!(app, "validation_user");

    let cases = vec![
        json!({ "title": "", "content": "c" }),
        json!({ "title": "t", "content": "" }),
        json!({ "title": "t".repeat(51), "content": "c" }),
        json!({ "title": "t", "content": "c".repeat(256) }),
    ];
    for payload in cases {
        let req = test::TestRequest::post()
            .uri("/api/todo")
            .append_header(("Authorization", format!("Bearer {}", token)))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
    }

    // A category the user does not own reports not found.
    let req = test::TestRequest::post()
        .uri("/api/todo")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "title": "t", "content": "c", "categoryId": "no-such-category" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], messages::CATEGORY_NOT_FOUND);
}

#[actix_rt::test]
async fn test_unparseable_query_params_get_the_envelope() {
    let pool = test_pool().await;
    let app = init_app!(pool);
    let token = register_user!(app, "query_user");

    // A non-numeric status filter fails query deserialization; the failure
    // must still come back as the uniform envelope, like a bad JSON body.
    for query in ["?status=abc", "?page=first", "?pageSize=lots"] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/todo{}", query))
            .append_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query: {}", query);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 0, "query: {}", query);
        assert_eq!(body["message"], messages::INVALID_REQUEST_BODY);
    }
}

#[actix_rt::test]
async fn test_delete_todo_shrinks_page_total() {
    let pool = test_pool().await;
    let app = init_app!(pool);
    let token = register_user!(app, "delete_user");

    let first = create_todo!(app, token, json!({ "title": "keep", "content": "c" }));
    let second = create_todo!(app, token, json!({ "title": "drop", "content": "c" }));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/todo/{}", second["id"].as_str().unwrap()))
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let page = fetch_page!(app, token, "");
    assert_eq!(page["total"], 1);
    assert_eq!(
        page["items"][0]["id"].as_str(),
        first["id"].as_str()
    );
}
