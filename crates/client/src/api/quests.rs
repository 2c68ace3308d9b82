//! Bindings for the `/quest` resource.

use serde::Deserialize;
use sidequest_core::quest::{NewQuest, Quest, QuestUpdate};

use crate::error::ApiError;
use crate::http::HttpClient;

/// Envelope wrapping a single quest.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub quest: Quest,
}

/// GET /api/v1/quests/{adventurer_id}
///
/// The listing comes back as a bare array, unlike the enveloped single-quest
/// responses.
pub async fn list_for(http: &HttpClient, adventurer_id: &str) -> Result<Vec<Quest>, ApiError> {
    Ok(http
        .get::<Vec<Quest>>(&http.api_path(&format!("/quests/{adventurer_id}")))
        .await?
        .data)
}

/// POST /api/v1/quest
pub async fn create(http: &HttpClient, payload: &NewQuest) -> Result<Quest, ApiError> {
    payload.check()?;
    let response = http
        .post::<QuestEnvelope, _>(&http.api_path("/quest"), payload)
        .await?;
    Ok(response.data.quest)
}

/// GET /api/v1/quest/{id}
pub async fn get(http: &HttpClient, quest_id: &str) -> Result<Quest, ApiError> {
    let response = http
        .get::<QuestEnvelope>(&http.api_path(&format!("/quest/{quest_id}")))
        .await?;
    Ok(response.data.quest)
}

/// PUT /api/v1/quest/{id}
pub async fn update(
    http: &HttpClient,
    quest_id: &str,
    changes: &QuestUpdate,
) -> Result<Quest, ApiError> {
    if changes.is_empty() {
        return Err(ApiError::Client("No quest fields to update".to_string()));
    }
    let response = http
        .put::<QuestEnvelope, _>(&http.api_path(&format!("/quest/{quest_id}")), changes)
        .await?;
    Ok(response.data.quest)
}

/// PATCH /api/v1/quest/{id}
///
/// Marks the quest complete; the backend flips the flag and returns the
/// updated quest.
pub async fn mark_completed(http: &HttpClient, quest_id: &str) -> Result<Quest, ApiError> {
    let response = http
        .patch_empty::<QuestEnvelope>(&http.api_path(&format!("/quest/{quest_id}")))
        .await?;
    Ok(response.data.quest)
}

/// DELETE /api/v1/quest/{id}
pub async fn delete(http: &HttpClient, quest_id: &str) -> Result<(), ApiError> {
    http.delete(&http.api_path(&format!("/quest/{quest_id}")))
        .await?;
    Ok(())
}
