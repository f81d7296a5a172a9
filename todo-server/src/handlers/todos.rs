//! Todo CRUD handlers
//!
//! Every handler here sits behind the `AuthenticatedUser` extractor and
//! operates only on the verified user's list. Mutations are whole-blob
//! read-modify-write cycles through the repository.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use todo_types::{
    CreateTodoRequest, DeleteTodoResponse, Todo, TodoListResponse, TodoResponse, UpdateTodoRequest,
};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /todos - the user's full list, in stored order
pub async fn list_todos(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<TodoListResponse>, ApiError> {
    let todos = state.repo.load(&auth.user_id).await?;

    tracing::info!(user_id = %auth.user_id, todo_count = todos.len(), "Listed todos");
    Ok(Json(TodoListResponse { todos }))
}

/// POST /todos - create a todo; the id and timestamps are server-generated
pub async fn create_todo(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    if request.title.trim().is_empty() {
        tracing::warn!(user_id = %auth.user_id, "Todo creation failed - missing title");
        return Err(ApiError::bad_request("Title is required"));
    }

    let now = Utc::now();
    let todo = Todo {
        id: Uuid::new_v4(),
        title: request.title,
        description: request.description,
        completed: false,
        created_at: now,
        updated_at: now,
    };

    let mut todos = state.repo.load(&auth.user_id).await?;
    todos.push(todo.clone());
    state.repo.save(&auth.user_id, &todos).await?;

    tracing::info!(
        user_id = %auth.user_id,
        todo_id = %todo.id,
        new_total_count = todos.len(),
        "Created todo"
    );

    Ok((StatusCode::CREATED, Json(TodoResponse { todo })))
}

/// PUT /todos/{id} - merge provided fields onto an existing todo
///
/// The path id always wins: a different id in the request body is ignored,
/// and `updated_at` is refreshed on every update.
pub async fn update_todo(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo_id = parse_todo_id(&id)?;
    let mut todos = state.repo.load(&auth.user_id).await?;

    let todo = todos
        .iter_mut()
        .find(|t| t.id == todo_id)
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;

    if let Some(title) = request.title {
        todo.title = title;
    }
    if let Some(description) = request.description {
        todo.description = description;
    }
    if let Some(completed) = request.completed {
        todo.completed = completed;
    }
    todo.updated_at = Utc::now();

    let updated = todo.clone();
    state.repo.save(&auth.user_id, &todos).await?;

    tracing::info!(
        user_id = %auth.user_id,
        todo_id = %updated.id,
        now_completed = updated.completed,
        "Updated todo"
    );

    Ok(Json(TodoResponse { todo: updated }))
}

/// DELETE /todos/{id} - remove exactly one todo
pub async fn delete_todo(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteTodoResponse>, ApiError> {
    let todo_id = parse_todo_id(&id)?;
    let mut todos = state.repo.load(&auth.user_id).await?;

    let position = todos
        .iter()
        .position(|t| t.id == todo_id)
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;

    let deleted = todos.remove(position);
    state.repo.save(&auth.user_id, &todos).await?;

    tracing::info!(
        user_id = %auth.user_id,
        todo_id = %deleted.id,
        remaining_count = todos.len(),
        "Deleted todo"
    );

    Ok(Json(DeleteTodoResponse {
        message: "Todo deleted successfully".to_string(),
        todo: deleted,
    }))
}

/// A path id that is not a UUID can never match a stored todo, so it gets
/// the same 404 as a well-formed unknown id.
fn parse_todo_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::not_found("Todo not found"))
}
