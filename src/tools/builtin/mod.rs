//! Built-in tools over the todo store.

pub mod todo;

pub use todo::{CreateTodoTool, DeleteByIdTool, GetAllTodosTool, SearchTodoTool};
