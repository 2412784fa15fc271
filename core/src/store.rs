//! Client-side list/detail state for todos.
//!
//! # Design
//! `TodoStore` is the single source of truth the UI reads. State lives in a
//! `tokio::sync::watch` channel: actions mutate it through `&self` (so several
//! actions can be in flight at once) and the UI re-renders from
//! [`TodoStore::subscribe`].
//!
//! List fetches are latest-wins. Each fetch takes a sequence number and only
//! the holder of the newest number may write `todos`, `total` or `loading`;
//! older responses are dropped as [`FetchOutcome::Superseded`].
//!
//! Create, update and delete patch the current page locally from the single
//! result instead of refetching. Failed actions are logged, sent to the
//! [`Notifier`] and returned; state is left untouched.
//!
//! [`TodoStore::reset_store`] starts a new epoch. Any action that started
//! before it still returns its result but no longer writes to state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::api::{RequestOptions, TodoApi};
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::types::{CreateTodo, ListQuery, Todo, TodoId, UpdateTodo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            total: 0,
        }
    }
}

/// Everything the list and detail views render from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    pub todos: Vec<Todo>,
    pub current_todo: Option<Todo>,
    pub pagination: Pagination,
    pub loading: bool,
    pub keyword: String,
    pub completed: Option<bool>,
}

impl TodoState {
    pub fn total_pages(&self) -> u64 {
        self.pagination.total.div_ceil(u64::from(self.pagination.size.max(1)))
    }

    /// The `GET /todos` parameters for the current page and filters.
    pub fn query(&self) -> ListQuery {
        ListQuery {
            page: self.pagination.page,
            size: self.pagination.size,
            keyword: self.keyword.clone(),
            completed: self.completed,
        }
    }
}

/// What happened to a list fetch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was written to state.
    Applied,
    /// A newer fetch was issued meanwhile; the response was dropped.
    Superseded,
}

pub struct TodoStore {
    api: TodoApi,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<TodoState>,
    fetch_seq: AtomicU64,
    epoch: AtomicU64,
}

impl TodoStore {
    pub fn new(api: TodoApi, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: watch::Sender::new(TodoState::default()),
            fetch_seq: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        }
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<TodoState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TodoState {
        self.state.borrow().clone()
    }

    pub fn total_pages(&self) -> u64 {
        self.state.borrow().total_pages()
    }

    /// Fetch the current page with the current filters.
    ///
    /// # Errors
    ///
    /// Returns the API error of the latest fetch; it has already been
    /// reported. Errors of superseded fetches are dropped.
    pub async fn fetch_todos(&self) -> Result<FetchOutcome, ApiError> {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.loading = true);
        let _loading = LoadingFlag { store: self, seq };

        let query = self.state.borrow().query();
        debug!(seq, ?query, "fetching todos");
        let result = self.api.get_todos(&query, RequestOptions::default()).await;

        if !self.is_latest(seq) {
            debug!(seq, ok = result.is_ok(), "discarding superseded todo list response");
            return Ok(FetchOutcome::Superseded);
        }
        match result {
            Ok(page) => {
                info!(seq, items = page.items.len(), total = page.total, "todo list loaded");
                self.state.send_modify(|s| {
                    s.todos = page.items;
                    s.pagination.total = page.total;
                });
                Ok(FetchOutcome::Applied)
            }
            Err(err) => Err(self.report("fetch_todos", err)),
        }
    }

    /// Go to `page` (at least 1) and refetch.
    pub async fn set_page(&self, page: u32) -> Result<FetchOutcome, ApiError> {
        self.state.send_modify(|s| s.pagination.page = page.max(1));
        self.fetch_todos().await
    }

    /// Change the page size (at least 1), restart at page 1 and refetch.
    pub async fn set_size(&self, size: u32) -> Result<FetchOutcome, ApiError> {
        self.state.send_modify(|s| {
            s.pagination.size = size.max(1);
            s.pagination.page = 1;
        });
        self.fetch_todos().await
    }

    pub async fn set_keyword(&self, keyword: impl Into<String>) -> Result<FetchOutcome, ApiError> {
        let keyword = keyword.into();
        self.state.send_modify(|s| {
            s.keyword = keyword;
            s.pagination.page = 1;
        });
        self.fetch_todos().await
    }

    pub async fn set_completed_filter(&self, completed: Option<bool>) -> Result<FetchOutcome, ApiError> {
        self.state.send_modify(|s| {
            s.completed = completed;
            s.pagination.page = 1;
        });
        self.fetch_todos().await
    }

    /// Load one todo into `current_todo` without touching the list.
    pub async fn fetch_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.api.get_todo_by_id(id, RequestOptions::quiet()).await {
            Ok(todo) => {
                debug!(id, "current todo loaded");
                if self.still_in(epoch, "fetch_todo") {
                    self.state.send_modify(|s| s.current_todo = Some(todo.clone()));
                }
                Ok(todo)
            }
            Err(err) => Err(self.report("fetch_todo", err)),
        }
    }

    /// Create a todo and put it at the top of the current page.
    pub async fn create_todo(&self, data: &CreateTodo) -> Result<Todo, ApiError> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.api.create_todo(data, RequestOptions::default()).await {
            Ok(todo) => {
                info!(id = todo.id, "todo created");
                if self.still_in(epoch, "create_todo") {
                    self.state.send_modify(|s| {
                        s.todos.insert(0, todo.clone());
                        s.pagination.total += 1;
                    });
                }
                Ok(todo)
            }
            Err(err) => Err(self.report("create_todo", err)),
        }
    }

    /// Update a todo and merge the server's echo into the listed copy.
    ///
    /// The list is left alone when `id` is not on the current page.
    pub async fn update_todo(&self, id: TodoId, data: &UpdateTodo) -> Result<Todo, ApiError> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let echo = match self.api.update_todo(id, data, RequestOptions::default()).await {
            Ok(todo) => todo,
            Err(err) => return Err(self.report("update_todo", err)),
        };
        info!(id, "todo updated");
        if !self.still_in(epoch, "update_todo") {
            return Ok(echo);
        }
        self.state.send_if_modified(|s| {
            let mut modified = false;
            if let Some(item) = s.todos.iter_mut().find(|t| t.id == id) {
                item.merge(echo.clone());
                modified = true;
            }
            if let Some(current) = s.current_todo.as_mut().filter(|t| t.id == id) {
                current.merge(echo.clone());
                modified = true;
            }
            modified
        });
        Ok(echo)
    }

    /// Flip `completed` of a todo on the current page.
    pub async fn toggle_completed(&self, id: TodoId) -> Result<Todo, ApiError> {
        let completed = self
            .state
            .borrow()
            .todos
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.completed);
        let Some(completed) = completed else {
            return Err(self.report("toggle_completed", ApiError::NotInList(id)));
        };
        let data = UpdateTodo {
            completed: Some(!completed),
            ..UpdateTodo::default()
        };
        self.update_todo(id, &data).await
    }

    /// Delete a todo and drop it from the current page.
    ///
    /// `total` is decremented even when `id` was not listed.
    pub async fn delete_todo(&self, id: TodoId) -> Result<(), ApiError> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        if let Err(err) = self.api.delete_todo(id, RequestOptions::default()).await {
            return Err(self.report("delete_todo", err));
        }
        info!(id, "todo deleted");
        if !self.still_in(epoch, "delete_todo") {
            return Ok(());
        }
        self.state.send_modify(|s| {
            if let Some(pos) = s.todos.iter().position(|t| t.id == id) {
                s.todos.remove(pos);
            }
            s.pagination.total = s.pagination.total.saturating_sub(1);
            if s.current_todo.as_ref().is_some_and(|t| t.id == id) {
                s.current_todo = None;
            }
        });
        Ok(())
    }

    /// Restore defaults. In-flight fetches and mutations no longer touch state.
    pub fn reset_store(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.fetch_seq.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(TodoState::default());
        debug!("todo store reset");
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.fetch_seq.load(Ordering::SeqCst) == seq
    }

    fn still_in(&self, epoch: u64, action: &'static str) -> bool {
        let current = self.epoch.load(Ordering::SeqCst) == epoch;
        if !current {
            debug!(action, "store was reset meanwhile, result not applied");
        }
        current
    }

    fn report(&self, action: &'static str, err: ApiError) -> ApiError {
        error!(action, error = %err, redirect = ?err.redirect(), "todo action failed");
        self.notifier.error(&err.to_string());
        err
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore")
            .field("api", &self.api)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// Clears `loading` when the latest fetch ends, however it ends.
struct LoadingFlag<'a> {
    store: &'a TodoStore,
    seq: u64,
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        if self.store.is_latest(self.seq) {
            self.store.state.send_modify(|s| s.loading = false);
        }
    }
}
