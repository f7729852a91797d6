//! # API Route Modules
//!
//! - `files`: the namespace → project → document hierarchy under `/files`.
//!   Reads are public; creates, uploads and deletes pass the basic-auth gate.
//! - `documents`: privileged flat listings (`/links`, `/documents`) and the
//!   public raw-bytes download at `/documents/:id`.

pub mod documents;
pub mod files;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusBody {
    /// Always `"success"`.
    pub status: String,
}

impl StatusBody {
    /// The `{"status": "success"}` body.
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}
