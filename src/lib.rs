//! Todo Assist — a todo list driven by HTTP or by talking to a model.

pub mod api;
pub mod app;
pub mod assistant;
pub mod config;
pub mod error;
pub mod llm;
pub mod repl;
pub mod store;
pub mod todos;
pub mod tools;
