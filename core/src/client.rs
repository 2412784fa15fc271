//! HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds the API root and a shared cache-busting counter; it
//! carries no other state between calls. Each CRUD operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller executes the HTTP round-trip,
//! keeping this layer deterministic apart from the cache-busting stamp.
//!
//! Every `parse_*` unwraps the `{code, msg, data}` envelope: callers only
//! ever see `data` or an [`ApiError`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, ListQuery, Todo, TodoId, TodoPage, UpdateTodo};

/// Query parameter carrying the cache-busting stamp on GET requests.
pub const CACHE_BUST_PARAM: &str = "_";

/// Millisecond timestamps that never repeat or go backwards.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicU64,
}

impl CacheBuster {
    pub fn next(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let stamp = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, stamp, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return stamp,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Client for the todo API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. Clones share one [`CacheBuster`].
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    cache_buster: Arc<CacheBuster>,
}

impl TodoClient {
    /// `base_url` is the API root, prefix included (e.g. `http://host/api`).
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_buster: Arc::new(CacheBuster::default()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self, query: &ListQuery) -> HttpRequest {
        self.get(format!("{}/todos", self.base_url), query.to_pairs())
    }

    pub fn build_get_todo(&self, id: TodoId) -> HttpRequest {
        self.get(format!("{}/todos/{id}", self.base_url), Vec::new())
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        if input.title.trim().is_empty() {
            return Err(ApiError::InvalidInput("title must not be empty".to_string()));
        }
        json_request(HttpMethod::Post, format!("{}/todos", self.base_url), input)
    }

    pub fn build_update_todo(&self, id: TodoId, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ApiError::InvalidInput("title must not be empty".to_string()));
        }
        json_request(HttpMethod::Put, format!("{}/todos/{id}", self.base_url), input)
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/todos/{id}", self.base_url),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<TodoPage, ApiError> {
        parse_data(&response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(&response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        if response.body.trim().is_empty() && response.is_success() {
            return Ok(());
        }
        let envelope = parse_envelope(&response)?;
        envelope.into_result().map(|_| ())
    }

    fn get(&self, path: String, mut query: Vec<(String, String)>) -> HttpRequest {
        query.push((CACHE_BUST_PARAM.to_string(), self.cache_buster.next().to_string()));
        HttpRequest {
            method: HttpMethod::Get,
            path,
            query,
            headers: Vec::new(),
            body: None,
        }
    }
}

fn json_request<T: Serialize>(method: HttpMethod, path: String, input: &T) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        query: Vec::new(),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

/// Read the envelope, falling back to the HTTP status when the body is not one.
fn parse_envelope(response: &HttpResponse) -> Result<envelope::Envelope<serde_json::Value>, ApiError> {
    match envelope::peek(&response.body) {
        Some(envelope) => Ok(envelope),
        None if !response.is_success() => Err(ApiError::HttpError {
            status: response.status,
            body: response.body.clone(),
        }),
        None => Err(ApiError::DeserializationError(format!(
            "expected a response envelope, got: {}",
            response.body
        ))),
    }
}

fn parse_data<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    envelope::unwrap_data(parse_envelope(response)?)
}
