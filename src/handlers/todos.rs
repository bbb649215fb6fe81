//! Todo endpoints. Every route sits behind `jwt_auth_middleware`.
//!
//! - `POST /api/todos` - create a todo for the caller
//! - `GET /api/todos` - list the caller's todos, optional `?status=`
//! - `PUT /api/todos/:id` - partial update of an owned todo
//! - `DELETE /api/todos/:id` - remove an owned todo

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection},
        Path, Query, State,
    },
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::database::models::todo::Todo;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::router::AppState;
use crate::services::todo_service::TodoAction;
use crate::types::{CreateTodoRequest, ListTodosQuery, UpdateTodoRequest};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/todos
///
/// - `201 Created`: the new todo
/// - `400 Bad Request`: missing or blank title, malformed body
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = payload?;

    let todo = state
        .todos
        .create(user.id, input)
        .await
        .map_err(|e| ApiError::from_todo_error(e, TodoAction::Create))?;

    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /api/todos
///
/// Unknown `status` values are ignored rather than rejected.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListTodosQuery>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state
        .todos
        .list(user.id, query.status_filter())
        .await
        .map_err(|e| ApiError::from_todo_error(e, TodoAction::List))?;

    Ok(Json(todos))
}

/// PUT /api/todos/:id
///
/// - `200 OK`: the updated todo
/// - `404 Not Found`: no todo with this id
/// - `403 Forbidden`: todo belongs to another user
///
/// The body is only decoded once the caller is known to own the todo, and
/// a missing body means "no changes".
#[tracing::instrument(skip_all, fields(user_id = %user.id, todo_id = %todo_id))]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(todo_id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Todo>, ApiError> {
    let body = body?;

    let todo = state
        .todos
        .find_owned(user.id, &todo_id, TodoAction::Update)
        .await
        .map_err(|e| ApiError::from_todo_error(e, TodoAction::Update))?;

    let input = decode_update(&headers, &body)?;

    let todo = state
        .todos
        .apply_changes(todo, input.into())
        .await
        .map_err(|e| ApiError::from_todo_error(e, TodoAction::Update))?;

    Ok(Json(todo))
}

fn decode_update(headers: &HeaderMap, body: &[u8]) -> Result<UpdateTodoRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UpdateTodoRequest::default());
    }
    if !has_json_content_type(headers) {
        return Err(ApiError::invalid_json(
            "Expected request with `Content-Type: application/json`",
        ));
    }

    let Json(input) = Json::<UpdateTodoRequest>::from_bytes(body)?;
    Ok(input)
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(essence) = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
    else {
        return false;
    };

    let essence = essence.trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// DELETE /api/todos/:id
#[tracing::instrument(skip_all, fields(user_id = %user.id, todo_id = %todo_id))]
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(todo_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .todos
        .delete(user.id, &todo_id)
        .await
        .map_err(|e| ApiError::from_todo_error(e, TodoAction::Delete))?;

    Ok(Json(MessageResponse {
        message: "Todo removed".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Patch;
    use axum::http::HeaderValue;

    fn json_headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn empty_update_body_means_no_changes() {
        for body in [&b""[..], &b"  \n"[..]] {
            let input = decode_update(&HeaderMap::new(), body).unwrap();
            assert!(input.title.is_absent());
            assert!(input.description.is_absent());
            assert!(input.status.is_none());
        }
    }

    #[test]
    fn update_body_needs_json_content_type() {
        let body = br#"{"title":"x"}"#;

        let err = decode_update(&HeaderMap::new(), body).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_JSON");

        let input = decode_update(&json_headers("application/json; charset=utf-8"), body).unwrap();
        assert_eq!(input.title, Patch::Value("x".to_string()));

        assert!(decode_update(&json_headers("application/merge-patch+json"), body).is_ok());
        assert!(decode_update(&json_headers("text/plain"), body).is_err());
    }

    #[test]
    fn malformed_update_body_is_invalid_json() {
        let err = decode_update(&json_headers("application/json"), b"{\"title\":").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_JSON");
    }
}
