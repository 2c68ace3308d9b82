//! User model and the account payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::adventurer::Adventurer;
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

/// The session user as returned by the backend.
///
/// The client holds a read-mostly copy fetched during the session check and
/// replaces it wholesale after a profile update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Nested adventurers, present on some endpoints only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adventurers: Option<Vec<Adventurer>>,
}

/// Payload for `POST /api/v1/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 3, max = 100, message = "username must be 3-100 characters"))]
    pub username: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

impl RegisterUser {
    /// Validate the payload before it is sent.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(CoreError::from_validation)
    }
}

/// Credentials for `POST /api/v1/auth/login`.
///
/// Sent form-urlencoded; the login route speaks the OAuth2 password shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Partial update for `PUT /api/v1/user/{id}`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 3, max = 100, message = "username must be 3-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[validate(email(message = "email must be a valid address"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    /// True when no field is set; the client skips the request entirely.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }

    /// Validate the set fields before they are sent.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(CoreError::from_validation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
