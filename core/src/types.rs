//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Ids are
//! backend-assigned integers; the client never invents one.

use serde::{Deserialize, Deserializer, Serialize};

/// Backend-assigned todo identifier.
pub type TodoId = i64;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// The backend may send `null` where a value is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Todo {
    /// Shallow-merge a server echo into this item.
    ///
    /// Required fields always come from `echo`; optional fields the server
    /// left out keep their local value.
    pub fn merge(&mut self, echo: Todo) {
        self.title = echo.title;
        self.completed = echo.completed;
        if echo.content.is_some() {
            self.content = echo.content;
        }
        if echo.created_at.is_some() {
            self.created_at = echo.created_at;
        }
        if echo.updated_at.is_some() {
            self.updated_at = echo.updated_at;
        }
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// One page of todos plus the total matching the active filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub total: u64,
}

/// Pagination and filter parameters for `GET /todos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub keyword: String,
    pub completed: Option<bool>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            keyword: String::new(),
            completed: None,
        }
    }
}

impl ListQuery {
    /// Query pairs in wire order. Empty keyword and unset completed are omitted.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        if !self.keyword.is_empty() {
            pairs.push(("keyword".to_string(), self.keyword.clone()));
        }
        if let Some(completed) = self.completed {
            pairs.push(("completed".to_string(), completed.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: TodoId) -> Todo {
        Todo {
            id,
            title: "Walk dog".to_string(),
            content: Some("around the block".to_string()),
            completed: false,
            created_at: Some(100),
            updated_at: Some(100),
        }
    }

    #[test]
    fn todo_accepts_description_alias() {
        let todo: Todo =
            serde_json::from_str(r#"{"id":3,"title":"t","description":"d","completed":true}"#).unwrap();
        assert_eq!(todo.content.as_deref(), Some("d"));
        assert!(todo.completed);
        assert!(todo.created_at.is_none());
    }

    #[test]
    fn todo_completed_defaults_to_false() {
        let todo: Todo = serde_json::from_str(r#"{"id":1,"title":"t"}"#).unwrap();
        assert!(!todo.completed);
    }

    #[test]
    fn todo_null_fields_fall_back_to_defaults() {
        let todo: Todo = serde_json::from_str(
            r#"{"id":1,"title":null,"description":null,"completed":null,"created_at":null,"updated_at":null}"#,
        )
        .unwrap();
        assert_eq!(todo.title, "");
        assert!(!todo.completed);
        assert!(todo.content.is_none());
    }

    #[test]
    fn page_with_a_null_completed_item_still_parses() {
        let page: TodoPage = serde_json::from_str(
            r#"{"items":[{"id":1,"title":"t","completed":null},{"id":2,"title":"u","completed":true}],"total":2}"#,
        )
        .unwrap();
        assert!(!page.items[0].completed);
        assert!(page.items[1].completed);
    }

    #[test]
    fn merge_keeps_local_optional_fields() {
        let mut local = todo(1);
        local.merge(Todo {
            id: 1,
            title: "Walk cat".to_string(),
            content: None,
            completed: true,
            created_at: None,
            updated_at: Some(200),
        });
        assert_eq!(local.title, "Walk cat");
        assert!(local.completed);
        assert_eq!(local.content.as_deref(), Some("around the block"));
        assert_eq!(local.created_at, Some(100));
        assert_eq!(local.updated_at, Some(200));
    }

    #[test]
    fn create_todo_omits_unset_fields() {
        let body = serde_json::to_value(CreateTodo::new("x")).unwrap();
        assert_eq!(body, serde_json::json!({"title": "x"}));
    }

    #[test]
    fn list_query_skips_empty_filters() {
        let pairs = ListQuery::default().to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "1".to_string()),
                ("size".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn list_query_includes_active_filters() {
        let query = ListQuery {
            page: 2,
            size: 5,
            keyword: "milk".to_string(),
            completed: Some(false),
        };
        let pairs = query.to_pairs();
        assert!(pairs.contains(&("keyword".to_string(), "milk".to_string())));
        assert!(pairs.contains(&("completed".to_string(), "false".to_string())));
    }
}
