//! Handler types and dependencies

use std::sync::Arc;

use crate::telegram::flow::FormatSelectionFlow;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub flow: Arc<FormatSelectionFlow>,
}

impl HandlerDeps {
    pub fn new(flow: Arc<FormatSelectionFlow>) -> Self {
        Self { flow }
    }
}
