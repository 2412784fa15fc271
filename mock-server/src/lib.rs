use std::{
    collections::BTreeMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const API_PREFIX: &str = "/api";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// `{code, msg, data}` wrapper around every response.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub msg: String,
    pub data: Option<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<Todo>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, alias = "description")]
    pub content: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    #[serde(alias = "description")]
    pub content: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    pub keyword: Option<String>,
    pub completed: Option<bool>,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

#[derive(Debug)]
pub struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Todo>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

pub type Db = Arc<RwLock<Table>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Table::default()));
    let todos = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .with_state(db);
    Router::new().nest(API_PREFIX, todos)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn success<T: Serialize>(status: StatusCode, code: i64, data: Option<T>) -> Response {
    let body = Envelope {
        code,
        msg: "success".to_string(),
        data,
    };
    (status, Json(body)).into_response()
}

/// Business failure: HTTP 200 with the failure code in the envelope.
fn failed(code: i64, msg: &str) -> Response {
    let body: Envelope<()> = Envelope {
        code,
        msg: msg.to_string(),
        data: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Request validation failure: HTTP 422 with an envelope.
fn invalid(detail: String) -> Response {
    debug!(%detail, "rejected request");
    let body: Envelope<()> = Envelope {
        code: 422,
        msg: format!("Invalid parameters: {detail}"),
        data: None,
    };
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

fn not_found() -> Response {
    failed(404, "Todo not found")
}

fn matches_keyword(todo: &Todo, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    todo.title.to_lowercase().contains(&keyword)
        || todo
            .content
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(&keyword))
}

async fn list_todos(State(db): State<Db>, params: Result<Query<ListParams>, QueryRejection>) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return invalid(rejection.body_text()),
    };
    let page = params.page.max(1);
    let size = params.size.max(1);
    let keyword = params.keyword.unwrap_or_default();

    let table = db.read().await;
    let matching: Vec<&Todo> = table
        .rows
        .values()
        .filter(|t| keyword.is_empty() || matches_keyword(t, &keyword))
        .filter(|t| params.completed.map_or(true, |c| t.completed == c))
        .collect();
    let total = matching.len() as u64;
    let skip = (page as usize - 1) * size as usize;
    let items = matching
        .into_iter()
        .skip(skip)
        .take(size as usize)
        .cloned()
        .collect();

    success(
        StatusCode::OK,
        200,
        Some(PageResult {
            items,
            total,
            page,
            size,
        }),
    )
}

async fn create_todo(State(db): State<Db>, input: Result<Json<CreateTodo>, JsonRejection>) -> Response {
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return invalid(rejection.body_text()),
    };
    if input.title.trim().is_empty() {
        return failed(400, "title must not be empty");
    }

    let mut table = db.write().await;
    let id = table.next_id;
    table.next_id += 1;
    let stamp = now();
    let todo = Todo {
        id,
        title: input.title,
        content: input.content,
        completed: input.completed,
        created_at: stamp,
        updated_at: stamp,
    };
    table.rows.insert(id, todo.clone());
    info!(id, "todo created");
    success(StatusCode::CREATED, 201, Some(todo))
}

async fn get_todo(State(db): State<Db>, id: Result<Path<i64>, PathRejection>) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return invalid(rejection.body_text()),
    };
    let table = db.read().await;
    match table.rows.get(&id) {
        Some(todo) => success(StatusCode::OK, 200, Some(todo.clone())),
        None => not_found(),
    }
}

async fn update_todo(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
    input: Result<Json<UpdateTodo>, JsonRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return invalid(rejection.body_text()),
    };
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return invalid(rejection.body_text()),
    };
    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return failed(400, "title must not be empty");
    }

    let mut table = db.write().await;
    let Some(todo) = table.rows.get_mut(&id) else {
        return not_found();
    };
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(content) = input.content {
        todo.content = Some(content);
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    todo.updated_at = now();
    success(StatusCode::OK, 200, Some(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, id: Result<Path<i64>, PathRejection>) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return invalid(rejection.body_text()),
    };
    let mut table = db.write().await;
    match table.rows.remove(&id) {
        Some(_) => {
            info!(id, "todo deleted");
            success::<()>(StatusCode::OK, 204, None)
        }
        None => not_found(),
    }
}
