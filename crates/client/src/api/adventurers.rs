//! Bindings for the `/adventurer` resource.

use serde::Deserialize;
use sidequest_core::adventurer::{Adventurer, NewAdventurer};

use crate::error::ApiError;
use crate::http::HttpClient;

/// Response of `GET /api/v1/adventurers`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdventurerList {
    pub adventurers: Vec<Adventurer>,
    pub count: i64,
}

/// Envelope wrapping a single adventurer.
#[derive(Debug, Clone, Deserialize)]
pub struct AdventurerEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub adventurer: Adventurer,
}

/// Response of `POST /api/v1/adventurer/{id}/quest/{quest_id}`.
///
/// Carries the adventurer re-computed server-side after the completion,
/// plus what the completion changed.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestCompletion {
    #[serde(default)]
    pub message: Option<String>,
    pub adventurer: Adventurer,
    pub was_new_completion: bool,
    pub leveled_up: bool,
}

/// GET /api/v1/adventurers
pub async fn list(http: &HttpClient) -> Result<AdventurerList, ApiError> {
    Ok(http
        .get::<AdventurerList>(&http.api_path("/adventurers"))
        .await?
        .data)
}

/// POST /api/v1/adventurer
pub async fn create(http: &HttpClient, payload: &NewAdventurer) -> Result<Adventurer, ApiError> {
    payload.check()?;
    let response = http
        .post::<AdventurerEnvelope, _>(&http.api_path("/adventurer"), payload)
        .await?;
    Ok(response.data.adventurer)
}

/// GET /api/v1/adventurer/{id}
pub async fn get(http: &HttpClient, adventurer_id: &str) -> Result<Adventurer, ApiError> {
    let response = http
        .get::<AdventurerEnvelope>(&http.api_path(&format!("/adventurer/{adventurer_id}")))
        .await?;
    Ok(response.data.adventurer)
}

/// POST /api/v1/adventurer/{id}/quest/{quest_id}
///
/// Marks the quest complete for the adventurer and returns the level-up
/// outcome the backend computed.
pub async fn complete_quest(
    http: &HttpClient,
    adventurer_id: &str,
    quest_id: &str,
) -> Result<QuestCompletion, ApiError> {
    let path = http.api_path(&format!("/adventurer/{adventurer_id}/quest/{quest_id}"));
    Ok(http.post_empty::<QuestCompletion>(&path).await?.data)
}
