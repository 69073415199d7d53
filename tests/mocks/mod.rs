//! Mock implementations for testing

pub mod mock_resolver;

#[allow(unused_imports)]
pub use mock_resolver::{format, sample_listing, FetchCall, FetchScript, ListScript, ScriptedResolver};
