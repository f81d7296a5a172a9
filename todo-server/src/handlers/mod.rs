//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod health;
pub mod todos;

pub use health::health;
pub use todos::{create_todo, delete_todo, list_todos, update_todo};
