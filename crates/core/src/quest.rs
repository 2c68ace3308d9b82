//! Quest model and the create/update payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

/// Experience reward applied when a quest is created without one.
pub const DEFAULT_EXPERIENCE_REWARD: i64 = 50;

/// A quest as returned by the backend. Belongs to exactly one adventurer,
/// referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: EntityId,
    pub title: String,
    pub experience_reward: i64,
    pub completed: bool,
    pub adventurer_id: EntityId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Payload for `POST /api/v1/quest`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewQuest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,

    #[validate(range(min = 0, message = "experience reward cannot be negative"))]
    #[serde(default = "default_reward")]
    pub experience_reward: i64,

    #[validate(length(min = 1, message = "adventurer_id must not be empty"))]
    pub adventurer_id: EntityId,
}

fn default_reward() -> i64 {
    DEFAULT_EXPERIENCE_REWARD
}

impl NewQuest {
    pub fn new(title: impl Into<String>, adventurer_id: impl Into<EntityId>) -> Self {
        Self {
            title: title.into(),
            experience_reward: DEFAULT_EXPERIENCE_REWARD,
            adventurer_id: adventurer_id.into(),
        }
    }

    pub fn with_reward(mut self, experience_reward: i64) -> Self {
        self.experience_reward = experience_reward;
        self
    }

    /// Validate the payload before it is sent.
    ///
    /// A whitespace-only title counts as empty, matching the backend rule.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation(
                "Quest title cannot be empty".to_string(),
            ));
        }
        self.validate().map_err(CoreError::from_validation)
    }
}

/// Partial update for `PUT /api/v1/quest/{id}`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_reward: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl QuestUpdate {
    /// True when no field is set; the client skips the request entirely.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.experience_reward.is_none() && self.completed.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- NewQuest ------------------------------------------------------------

    #[test]
    fn default_reward_applied() {
        let q = NewQuest::new("Slay the dragon", "a1");
        assert_eq!(q.experience_reward, DEFAULT_EXPERIENCE_REWARD);
        assert!(q.check().is_ok());
    }

    #[test]
    fn empty_title_rejected() {
        assert!(NewQuest::new("", "a1").check().is_err());
        assert!(NewQuest::new("   ", "a1").check().is_err());
    }

    #[test]
    fn negative_reward_rejected() {
        let q = NewQuest::new("Fetch water", "a1").with_reward(-1);
        assert!(q.check().is_err());
    }

    #[test]
    fn missing_reward_defaults_on_deserialize() {
        let q: NewQuest =
            serde_json::from_value(serde_json::json!({"title": "t", "adventurer_id": "a1"}))
                .unwrap();
        assert_eq!(q.experience_reward, DEFAULT_EXPERIENCE_REWARD);
    }

    // -- QuestUpdate ---------------------------------------------------------

    #[test]
    fn update_serializes_only_set_fields() {
        let upd = QuestUpdate {
            completed: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_value(&upd).unwrap();
        assert_eq!(json, serde_json::json!({"completed": true}));
    }

    #[test]
    fn empty_update_detected() {
        assert!(QuestUpdate::default().is_empty());
        assert!(!QuestUpdate {
            title: Some("x".into()),
            ..Default::default()
        }
        .is_empty());
    }
}
