/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Write operations that run through schema validation.
/// Defaults are only applied on `Create`; `Update` validates the merged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
}
