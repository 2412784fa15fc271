//! Page routing table.
//!
//! Pure configuration: each view maps to one path shape. `/` redirects to the
//! list. The two error pages are the navigation targets of fatal API errors.

use std::fmt;

use crate::types::TodoId;

/// Base path of the todo views.
pub const BASE_PATH: &str = "/todos";

/// A navigable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    List,
    Create,
    Detail(TodoId),
    Edit(TodoId),
    NotFound,
    ServerError,
}

impl Route {
    /// Resolve a path to a route, following the `/` redirect.
    ///
    /// Query strings and a trailing slash are ignored. Paths must be
    /// absolute. Unknown paths yield `None`; the caller decides whether that
    /// means [`Route::NotFound`].
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        if path.is_empty() {
            return Some(Route::List);
        }
        let trimmed = path.strip_prefix('/')?.trim_end_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };
        match segments.as_slice() {
            [] => Some(Route::List),
            ["todos"] => Some(Route::List),
            ["todos", "create"] => Some(Route::Create),
            ["todos", id] => id.parse().ok().map(Route::Detail),
            ["todos", id, "edit"] => id.parse().ok().map(Route::Edit),
            ["404"] => Some(Route::NotFound),
            ["500"] => Some(Route::ServerError),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::List => BASE_PATH.to_string(),
            Route::Create => format!("{BASE_PATH}/create"),
            Route::Detail(id) => format!("{BASE_PATH}/{id}"),
            Route::Edit(id) => format!("{BASE_PATH}/{id}/edit"),
            Route::NotFound => "/404".to_string(),
            Route::ServerError => "/500".to_string(),
        }
    }

    /// Stable view name, used by the rendering layer to pick a component.
    pub fn name(&self) -> &'static str {
        match self {
            Route::List => "todo-list",
            Route::Create => "todo-create",
            Route::Detail(_) => "todo-detail",
            Route::Edit(_) => "todo-edit",
            Route::NotFound => "not-found",
            Route::ServerError => "server-error",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
