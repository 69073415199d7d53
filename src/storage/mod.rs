//! Transient per-chat state

pub mod session;

// Re-exports for convenience
pub use session::{Session, SessionStore};
