//! Telegram bot handler tree configuration
//!
//! The dispatcher schema only extracts chat ids, text and callback data from
//! updates; all protocol decisions live in [`crate::telegram::flow`].

mod schema;
mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
