//! HTTP transport — REST endpoints over the store plus the chat endpoint.

pub mod routes;

pub use routes::{AppState, api_routes};
