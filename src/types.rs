//! Request payloads shared by the todo handlers and service

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::database::models::todo::TodoStatus;

/// A request field that can be left out, sent as `null`, or sent with a value.
///
/// Fields using this type must be marked `#[serde(default)]` so that a
/// missing key decodes to `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// `None` when absent, `Some(None)` when null
    pub fn into_update(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Patch::Value(v) => Some(v),
            Patch::Absent | Patch::Null => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// POST /api/todos body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// PUT /api/todos/:id body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    /// Kept loose: unrecognised values, including non-strings, are ignored.
    #[serde(default)]
    pub status: Option<Value>,
}

/// Field changes applied by an update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TodoStatus>,
}

impl From<UpdateTodoRequest> for TodoChanges {
    fn from(request: UpdateTodoRequest) -> Self {
        let status = request
            .status
            .as_ref()
            .and_then(Value::as_str)
            .and_then(TodoStatus::parse);

        Self {
            // title is required on the model, so null is treated like absent
            title: request.title.into_value(),
            description: request.description.into_update(),
            status,
        }
    }
}

/// GET /api/todos query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTodosQuery {
    pub status: Option<String>,
}

impl ListTodosQuery {
    pub fn status_filter(&self) -> Option<TodoStatus> {
        self.status.as_deref().and_then(TodoStatus::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(body: Value) -> TodoChanges {
        serde_json::from_value::<UpdateTodoRequest>(body).unwrap().into()
    }

    #[test]
    fn patch_distinguishes_absent_null_and_value() {
        let req: UpdateTodoRequest = serde_json::from_value(json!({ "description": null })).unwrap();
        assert!(req.title.is_absent());
        assert_eq!(req.description, Patch::Null);

        let req: UpdateTodoRequest = serde_json::from_value(json!({ "description": "" })).unwrap();
        assert_eq!(req.description, Patch::Value(String::new()));
    }

    #[test]
    fn empty_body_changes_nothing() {
        assert_eq!(update(json!({})), TodoChanges::default());
    }

    #[test]
    fn description_null_clears_and_title_null_is_ignored() {
        let changes = update(json!({ "title": null, "description": null }));
        assert_eq!(changes.title, None);
        assert_eq!(changes.description, Some(None));
    }

    #[test]
    fn empty_strings_are_applied() {
        let changes = update(json!({ "title": "", "description": "" }));
        assert_eq!(changes.title, Some(String::new()));
        assert_eq!(changes.description, Some(Some(String::new())));
    }

    #[test]
    fn only_recognised_status_values_change_status() {
        assert_eq!(update(json!({ "status": "completed" })).status, Some(TodoStatus::Completed));
        assert_eq!(update(json!({ "status": "pending" })).status, Some(TodoStatus::Pending));
        assert_eq!(update(json!({ "status": "archived" })).status, None);
        assert_eq!(update(json!({ "status": 1 })).status, None);
        assert_eq!(update(json!({ "status": null })).status, None);
    }

    #[test]
    fn list_query_ignores_unknown_status() {
        let query = ListTodosQuery { status: Some("done".to_string()) };
        assert_eq!(query.status_filter(), None);

        let query = ListTodosQuery { status: Some("pending".to_string()) };
        assert_eq!(query.status_filter(), Some(TodoStatus::Pending));

        assert_eq!(ListTodosQuery::default().status_filter(), None);
    }
}
