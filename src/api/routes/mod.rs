//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`warnings`] - Warning lists and details
//! - [`system`] - Health and OpenAPI

use serde::{Deserialize, Serialize};

mod system;
mod warnings;

// Re-export all handlers so `routes::function_name` continues to work
pub use system::*;
pub use warnings::*;

/// Query parameters for GET /warnings
#[derive(Debug, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WarningsQuery {
    /// State or territory code, e.g. "VIC" (case-insensitive)
    pub state: Option<String>,
}
