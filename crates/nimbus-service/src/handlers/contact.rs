//! Contact form handler.
//!
//! Submissions are validated and logged; nothing is persisted.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};

/// Contact form submission.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    /// Sender name.
    #[serde(default)]
    pub name: String,
    /// Sender email.
    #[serde(default)]
    pub email: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Message body.
    #[serde(default)]
    pub message: String,
}

/// Contact form acknowledgement.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    /// Always `true` when the submission was accepted.
    pub success: bool,
    /// Confirmation message for the frontend.
    pub message: String,
}

/// Accept a contact form submission.
pub async fn submit(Json(body): Json<ContactRequest>) -> Result<Json<ContactResponse>, ApiError> {
    let mut fields = Vec::new();

    let name = body.name.trim();
    if name.chars().count() < 2 {
        fields.push(FieldError {
            field: "name",
            message: "Name must be at least 2 characters".into(),
        });
    }

    let email = body.email.trim();
    if !email.contains('@') {
        fields.push(FieldError {
            field: "email",
            message: "Valid email is required".into(),
        });
    }

    let message = body.message.trim();
    if message.chars().count() < 10 {
        fields.push(FieldError {
            field: "message",
            message: "Message must be at least 10 characters".into(),
        });
    }

    if !fields.is_empty() {
        return Err(ApiError::Validation(fields));
    }

    tracing::info!(
        name = %name,
        email = %email,
        phone = ?body.phone.as_deref().map(str::trim),
        message_chars = message.chars().count(),
        "Contact form submission"
    );

    Ok(Json(ContactResponse {
        success: true,
        message: "Thank you for contacting Nimbus Hosting! We will respond soon.".into(),
    }))
}
