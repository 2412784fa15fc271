//! Client core for the todo service: API client, state store and routes.
//!
//! # Overview
//! The API client is layered. `TodoClient` builds `HttpRequest` values and
//! parses `HttpResponse` values without touching the network (host-does-IO
//! pattern); a `Transport` executes them; `TodoApi` ties both together with
//! the shared busy indicator. `TodoStore` sits on top and owns the list and
//! detail state the UI renders.
//!
//! # Design
//! - Every backend response is a `{code, msg, data}` envelope; only `data`
//!   or an `ApiError` ever leaves the client.
//! - Fatal envelope codes (404, 500) surface as dedicated error variants with
//!   a `redirect()` target; navigation is left to the UI shell.
//! - The busy indicator is reference-counted and list fetches are
//!   latest-wins, so overlapping requests cannot corrupt either.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod loading;
pub mod notify;
pub mod routes;
pub mod store;
pub mod transport;
pub mod types;

pub use api::{RequestOptions, TodoApi};
pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError};
pub use envelope::Envelope;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use loading::{BusyIndicator, LoadingIndicator};
pub use notify::{LogNotifier, Notifier};
pub use routes::Route;
pub use store::{FetchOutcome, Pagination, TodoState, TodoStore};
pub use transport::{ReqwestTransport, Transport};
pub use types::{CreateTodo, ListQuery, Todo, TodoId, TodoPage, UpdateTodo};
