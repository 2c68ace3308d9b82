//! Bindings for the `/user` resource.

use serde::Deserialize;
use sidequest_core::user::{User, UserUpdate};

use crate::error::ApiError;
use crate::http::HttpClient;

/// Response envelope of `PUT /api/v1/user/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

/// PUT /api/v1/user/{id}
///
/// Partial update: only the fields the caller set are serialized.
pub async fn update(
    http: &HttpClient,
    user_id: &str,
    changes: &UserUpdate,
) -> Result<User, ApiError> {
    changes.check()?;
    if changes.is_empty() {
        return Err(ApiError::Client("No profile fields to update".to_string()));
    }
    let response = http
        .put::<UserEnvelope, _>(&http.api_path(&format!("/user/{user_id}")), changes)
        .await?;
    Ok(response.data.user)
}
