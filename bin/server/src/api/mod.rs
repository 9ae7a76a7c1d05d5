//! JSON API handlers.
//!
//! Each handler authenticates with [`RequireAuth`](crate::auth::RequireAuth)
//! and authorizes through [`AppState`](crate::auth::AppState) before any
//! storage access.

pub mod announcements;
pub mod family_links;
pub mod grades;
pub mod students;
pub mod users;

use serde::Serialize;

/// Body returned by operations with nothing else to report.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Self = Self { success: true };
}
