//! Adventurer model, class tags, and the creation payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Class tags
// ---------------------------------------------------------------------------

/// Character class of an adventurer.
///
/// Serialized as the lowercase class name; the backend stores it as an
/// opaque string tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdventurerType {
    Amazon,
    Barbarian,
    Druid,
    Necromancer,
    Paladin,
    Sorceress,
}

impl AdventurerType {
    /// All valid class tags, in display order.
    pub const ALL: &'static [AdventurerType] = &[
        AdventurerType::Amazon,
        AdventurerType::Barbarian,
        AdventurerType::Druid,
        AdventurerType::Necromancer,
        AdventurerType::Paladin,
        AdventurerType::Sorceress,
    ];

    /// The lowercase wire tag for this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdventurerType::Amazon => "amazon",
            AdventurerType::Barbarian => "barbarian",
            AdventurerType::Druid => "druid",
            AdventurerType::Necromancer => "necromancer",
            AdventurerType::Paladin => "paladin",
            AdventurerType::Sorceress => "sorceress",
        }
    }
}

impl fmt::Display for AdventurerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdventurerType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        AdventurerType::ALL
            .iter()
            .find(|t| t.as_str() == needle)
            .copied()
            .ok_or_else(|| {
                let valid: Vec<&str> = AdventurerType::ALL.iter().map(|t| t.as_str()).collect();
                CoreError::Validation(format!(
                    "Unknown adventurer type: '{s}'. Valid types: {}",
                    valid.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// An adventurer as returned by the backend.
///
/// `experience_for_next_level`, `progress_percentage`, and
/// `completed_quests_count` are computed server-side; the client treats them
/// as read-only and replaces the whole record from response payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adventurer {
    pub id: EntityId,
    pub name: String,
    pub level: i64,
    pub experience: i64,
    pub experience_for_next_level: i64,
    pub progress_percentage: f64,
    pub completed_quests_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adventurer_type: Option<AdventurerType>,
}

/// Payload for `POST /api/v1/adventurer`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAdventurer {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: EntityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adventurer_type: Option<AdventurerType>,
}

impl NewAdventurer {
    pub fn new(name: impl Into<String>, user_id: impl Into<EntityId>) -> Self {
        Self {
            name: name.into(),
            user_id: user_id.into(),
            adventurer_type: None,
        }
    }

    pub fn with_type(mut self, adventurer_type: AdventurerType) -> Self {
        self.adventurer_type = Some(adventurer_type);
        self
    }

    /// Validate the payload before it is sent.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(CoreError::from_validation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
