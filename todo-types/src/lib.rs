//! Shared wire types for the passkey-todo system.
//!
//! Both the todo service (`todo-server`) and the session manager
//! (`todo-client`) speak JSON over HTTP; the structures here define that
//! contract in one place. Field names follow the wire convention
//! (camelCase) rather than Rust convention.

pub mod auth;
pub mod todo;

pub use auth::{CeremonyResult, RegisterBeginRequest, User, VerifyResponse};
pub use todo::{
    CreateTodoRequest, DeleteTodoResponse, HealthResponse, Todo, TodoListResponse, TodoResponse,
    UpdateTodoRequest,
};
