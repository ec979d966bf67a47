//! HTTP request handlers.

pub mod auth;
pub mod configs;
pub mod contact;
pub mod health;
pub mod user;

use serde::Serialize;

/// Success envelope: `{"success": true, "data": ...}`.
///
/// Every `/api` endpoint wraps its payload in this; errors use the
/// `{"success": false, "error": ...}` shape from [`crate::error`].
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    /// Always `true` on this type.
    pub success: bool,
    /// The payload.
    pub data: T,
}

impl<T> DataResponse<T> {
    /// Wrap a payload.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
