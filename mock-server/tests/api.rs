use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Envelope, PageResult, Todo};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// Send one request through a shared router so state persists across calls.
async fn call(
    app: &mut axum::routing::RouterIntoService<String>,
    request: Request<String>,
) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(request).await.unwrap()
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(empty_request("GET", "/api/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<PageResult> = body_json(resp).await;
    assert_eq!(env.code, 200);
    let page = env.data.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!((page.page, page.size), (1, 10));
}

#[tokio::test]
async fn list_ignores_cache_bust_param() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/todos?page=1&size=5&_=1700000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<PageResult> = body_json(resp).await;
    assert_eq!(env.data.unwrap().size, 5);
}

#[tokio::test]
async fn list_rejects_malformed_query() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/todos?page=first"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let env: Envelope<serde_json::Value> = body_json(resp).await;
    assert_eq!(env.code, 422);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let env: Envelope<Todo> = body_json(resp).await;
    assert_eq!(env.code, 201);
    let todo = env.data.unwrap();
    assert_eq!(todo.id, 1);
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_todo_blank_title_is_business_error() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"  "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<Todo> = body_json(resp).await;
    assert_eq!(env.code, 400);
    assert!(env.data.is_none());
}

#[tokio::test]
async fn create_todo_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let env: Envelope<serde_json::Value> = body_json(resp).await;
    assert_eq!(env.code, 422);
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found_is_enveloped() {
    let resp = app().oneshot(empty_request("GET", "/api/todos/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<Todo> = body_json(resp).await;
    assert_eq!(env.code, 404);
    assert_eq!(env.msg, "Todo not found");
}

#[tokio::test]
async fn get_todo_bad_id_returns_422() {
    let resp = app().oneshot(empty_request("GET", "/api/todos/not-a-number")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- update / delete ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/todos/999", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    let env: Envelope<Todo> = body_json(resp).await;
    assert_eq!(env.code, 404);
}

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/api/todos/999")).await.unwrap();

    let env: Envelope<()> = body_json(resp).await;
    assert_eq!(env.code, 404);
}

// --- pagination and filters ---

#[tokio::test]
async fn pagination_and_filters() {
    let mut app = app().into_service();

    for (title, completed) in [
        ("Buy milk", false),
        ("Buy bread", true),
        ("Walk dog", false),
        ("Milk the cow", true),
        ("Read book", false),
    ] {
        let body = format!(r#"{{"title":"{title}","completed":{completed}}}"#);
        let resp = call(&mut app, json_request("POST", "/api/todos", &body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // second page of size 2
    let resp = call(&mut app, empty_request("GET", "/api/todos?page=2&size=2")).await;
    let page = body_json::<Envelope<PageResult>>(resp).await.data.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 4]);

    // keyword is case-insensitive
    let resp = call(&mut app, empty_request("GET", "/api/todos?keyword=MILK")).await;
    let page = body_json::<Envelope<PageResult>>(resp).await.data.unwrap();
    assert_eq!(page.total, 2);

    // keyword and completed combine
    let resp = call(&mut app, empty_request("GET", "/api/todos?keyword=milk&completed=true")).await;
    let page = body_json::<Envelope<PageResult>>(resp).await.data.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Milk the cow");

    // page beyond the end is empty but keeps the total
    let resp = call(&mut app, empty_request("GET", "/api/todos?page=9&size=2")).await;
    let page = body_json::<Envelope<PageResult>>(resp).await.data.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 5);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let mut app = app().into_service();

    // create
    let resp = call(
        &mut app,
        json_request("POST", "/api/todos", r#"{"title":"Walk dog","content":"twice"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json::<Envelope<Todo>>(resp).await.data.unwrap();
    assert_eq!(created.title, "Walk dog");
    assert_eq!(created.content.as_deref(), Some("twice"));
    let id = created.id;

    // get
    let resp = call(&mut app, empty_request("GET", &format!("/api/todos/{id}"))).await;
    let fetched = body_json::<Envelope<Todo>>(resp).await.data.unwrap();
    assert_eq!(fetched.id, id);

    // update: only completed
    let resp = call(
        &mut app,
        json_request("PUT", &format!("/api/todos/{id}"), r#"{"completed":true}"#),
    )
    .await;
    let updated = body_json::<Envelope<Todo>>(resp).await.data.unwrap();
    assert_eq!(updated.title, "Walk dog"); // unchanged
    assert_eq!(updated.content.as_deref(), Some("twice")); // unchanged
    assert!(updated.completed);

    // update: only title
    let resp = call(
        &mut app,
        json_request("PUT", &format!("/api/todos/{id}"), r#"{"title":"Walk cat"}"#),
    )
    .await;
    let updated = body_json::<Envelope<Todo>>(resp).await.data.unwrap();
    assert_eq!(updated.title, "Walk cat");
    assert!(updated.completed); // unchanged from previous update

    // delete
    let resp = call(&mut app, empty_request("DELETE", &format!("/api/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<()> = body_json(resp).await;
    assert_eq!(env.code, 204);

    // get after delete: 404 envelope
    let resp = call(&mut app, empty_request("GET", &format!("/api/todos/{id}"))).await;
    let env: Envelope<Todo> = body_json(resp).await;
    assert_eq!(env.code, 404);

    // list after delete: empty
    let resp = call(&mut app, empty_request("GET", "/api/todos")).await;
    let page = body_json::<Envelope<PageResult>>(resp).await.data.unwrap();
    assert!(page.items.is_empty());

    // ids are never reused
    let resp = call(&mut app, json_request("POST", "/api/todos", r#"{"title":"Again"}"#)).await;
    let again = body_json::<Envelope<Todo>>(resp).await.data.unwrap();
    assert_eq!(again.id, id + 1);
}
