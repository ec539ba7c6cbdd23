//! Natural-language front-end: prompt the model, run at most one tool,
//! and turn the result into a reply.

pub mod controller;
pub mod sanitize;
pub mod turn;

pub use controller::{Assistant, ChatReply, Session};
pub use sanitize::clean_response;
pub use turn::Turn;
