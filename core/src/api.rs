//! Async API client: request builder + transport + loading indicator.
//!
//! One method per backend operation. Each resolves with the unwrapped `data`
//! of the envelope or an [`ApiError`]; the busy indicator is held for the
//! whole round-trip unless the caller opts out through [`RequestOptions`].

use std::sync::Arc;

use tracing::debug;

use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::loading::{BusyIndicator, LoadingIndicator, TracingIndicator};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{CreateTodo, ListQuery, Todo, TodoId, TodoPage, UpdateTodo};

/// Per-call request behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    pub show_loading: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { show_loading: true }
    }
}

impl RequestOptions {
    /// Background request: no busy indicator.
    pub fn quiet() -> Self {
        Self { show_loading: false }
    }
}

#[derive(Clone)]
pub struct TodoApi {
    client: TodoClient,
    transport: Arc<dyn Transport>,
    loading: LoadingIndicator,
}

impl TodoApi {
    pub fn new(client: TodoClient, transport: Arc<dyn Transport>, indicator: Arc<dyn BusyIndicator>) -> Self {
        Self {
            client,
            transport,
            loading: LoadingIndicator::new(indicator),
        }
    }

    /// Build a client talking to `config.api_root()` over `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(
            TodoClient::new(&config.api_root()),
            Arc::new(transport),
            Arc::new(TracingIndicator),
        ))
    }

    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    pub async fn create_todo(&self, input: &CreateTodo, options: RequestOptions) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.send(request, options).await?;
        self.client.parse_create_todo(response)
    }

    pub async fn get_todo_by_id(&self, id: TodoId, options: RequestOptions) -> Result<Todo, ApiError> {
        let request = self.client.build_get_todo(id);
        let response = self.send(request, options).await?;
        self.client.parse_get_todo(response)
    }

    pub async fn get_todos(&self, query: &ListQuery, options: RequestOptions) -> Result<TodoPage, ApiError> {
        let request = self.client.build_list_todos(query);
        let response = self.send(request, options).await?;
        self.client.parse_list_todos(response)
    }

    pub async fn update_todo(
        &self,
        id: TodoId,
        input: &UpdateTodo,
        options: RequestOptions,
    ) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, input)?;
        let response = self.send(request, options).await?;
        self.client.parse_update_todo(response)
    }

    pub async fn delete_todo(&self, id: TodoId, options: RequestOptions) -> Result<(), ApiError> {
        let request = self.client.build_delete_todo(id);
        let response = self.send(request, options).await?;
        self.client.parse_delete_todo(response)
    }

    async fn send(&self, request: HttpRequest, options: RequestOptions) -> Result<HttpResponse, ApiError> {
        let _guard = options.show_loading.then(|| self.loading.acquire());
        debug!(method = request.method.as_str(), path = %request.path, "api request");
        self.transport.execute(request).await
    }
}

impl std::fmt::Debug for TodoApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoApi")
            .field("base_url", &self.client.base_url())
            .field("loading", &self.loading)
            .finish()
    }
}
