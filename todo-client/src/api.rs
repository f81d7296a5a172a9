//! Typed client for the todo service
//!
//! Thin wrappers over `SessionManager::authenticated_request` that decode
//! the service's response shapes. `SessionExpired` passes through
//! unchanged so UIs can special-case it.

use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use todo_types::{DeleteTodoResponse, Todo, TodoListResponse, TodoResponse, UpdateTodoRequest};

use crate::error::SessionError;
use crate::session::SessionManager;

/// Client for one todo service deployment.
pub struct TodoApi {
    base_url: String,
}

impl TodoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The URL the session manager should revalidate restored tokens
    /// against: the list endpoint doubles as the validation probe.
    pub fn validation_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    /// GET /todos
    pub async fn list(&self, session: &mut SessionManager) -> Result<Vec<Todo>, SessionError> {
        let response = session
            .authenticated_request(Method::GET, &self.validation_url(), None)
            .await?;
        let body: TodoListResponse = decode(response).await?;
        Ok(body.todos)
    }

    /// POST /todos
    pub async fn create(
        &self,
        session: &mut SessionManager,
        title: &str,
        description: &str,
    ) -> Result<Todo, SessionError> {
        let body = serde_json::json!({ "title": title, "description": description });
        let response = session
            .authenticated_request(Method::POST, &format!("{}/todos", self.base_url), Some(body))
            .await?;
        let body: TodoResponse = decode(response).await?;
        Ok(body.todo)
    }

    /// PUT /todos/{id}
    ///
    /// Only the fields present in `patch` go on the wire, so the service
    /// merges rather than overwrites.
    pub async fn update(
        &self,
        session: &mut SessionManager,
        id: Uuid,
        patch: UpdateTodoRequest,
    ) -> Result<Todo, SessionError> {
        let mut body = serde_json::Map::new();
        if let Some(title) = patch.title {
            body.insert("title".to_string(), Value::String(title));
        }
        if let Some(description) = patch.description {
            body.insert("description".to_string(), Value::String(description));
        }
        if let Some(completed) = patch.completed {
            body.insert("completed".to_string(), Value::Bool(completed));
        }

        let response = session
            .authenticated_request(
                Method::PUT,
                &format!("{}/todos/{}", self.base_url, id),
                Some(Value::Object(body)),
            )
            .await?;
        let body: TodoResponse = decode(response).await?;
        Ok(body.todo)
    }

    /// Convenience for the completed checkbox.
    pub async fn set_completed(
        &self,
        session: &mut SessionManager,
        id: Uuid,
        completed: bool,
    ) -> Result<Todo, SessionError> {
        self.update(
            session,
            id,
            UpdateTodoRequest {
                completed: Some(completed),
                ..Default::default()
            },
        )
        .await
    }

    /// DELETE /todos/{id}
    pub async fn delete(
        &self,
        session: &mut SessionManager,
        id: Uuid,
    ) -> Result<DeleteTodoResponse, SessionError> {
        let response = session
            .authenticated_request(
                Method::DELETE,
                &format!("{}/todos/{}", self.base_url, id),
                None,
            )
            .await?;
        decode(response).await
    }
}

/// Decode a 2xx JSON body, or turn the service's `{error}` body into an
/// `Api` error.
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| format!("Request failed ({})", status));

    Err(SessionError::Api {
        status: status.as_u16(),
        message,
    })
}
