//! Shared application state type.

use std::sync::Arc;

use crate::bootstrap::AppContext;

/// State shared across all handlers.
pub type AppState = Arc<AppContext>;
