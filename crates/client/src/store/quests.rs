//! Quest list state.

use std::sync::Arc;

use sidequest_core::quest::{NewQuest, Quest, QuestUpdate};
use sidequest_core::types::EntityId;

use crate::api;
use crate::error::ApiError;
use crate::http::HttpClient;

/// Holds the quest list for one adventurer at a time.
pub struct QuestStore {
    http: Arc<HttpClient>,
    quests: Vec<Quest>,
    current: Option<EntityId>,
    error: Option<String>,
}

impl QuestStore {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            quests: Vec::new(),
            current: None,
            error: None,
        }
    }

    // -- state accessors -----------------------------------------------------

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    /// The selected quest, when the selection still references a list
    /// element.
    pub fn current(&self) -> Option<&Quest> {
        let id = self.current.as_deref()?;
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Select a quest locally. Fails when the id is not in the list, so the
    /// selection can never dangle.
    pub fn set_current(&mut self, id: &str) -> bool {
        if self.quests.iter().any(|q| q.id == id) {
            self.current = Some(id.to_string());
            true
        } else {
            false
        }
    }

    // -- operations ----------------------------------------------------------

    /// GET the quest list for an adventurer, replacing local state.
    ///
    /// A selection that no longer references a listed quest is cleared.
    pub async fn fetch_for(&mut self, adventurer_id: &str) -> Result<(), ApiError> {
        self.error = None;
        match api::quests::list_for(&self.http, adventurer_id).await {
            Ok(quests) => {
                self.quests = quests;
                if let Some(id) = &self.current {
                    if !self.quests.iter().any(|q| &q.id == id) {
                        self.current = None;
                    }
                }
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Create a quest and select it.
    pub async fn create(&mut self, payload: &NewQuest) -> Result<&Quest, ApiError> {
        self.error = None;
        match api::quests::create(&self.http, payload).await {
            Ok(quest) => {
                let id = quest.id.clone();
                self.upsert(quest);
                self.current = Some(id);
                Ok(self.current().expect("created quest is listed"))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Fetch one quest, merge it into the list, and select it.
    pub async fn get(&mut self, quest_id: &str) -> Result<&Quest, ApiError> {
        self.error = None;
        match api::quests::get(&self.http, quest_id).await {
            Ok(quest) => {
                let id = quest.id.clone();
                self.upsert(quest);
                self.current = Some(id);
                Ok(self.current().expect("fetched quest is listed"))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Partially update a quest.
    ///
    /// The server-confirmed record replaces the listed entry in place; a
    /// response for a quest that is no longer listed is ignored as a stale
    /// update target.
    pub async fn update(&mut self, quest_id: &str, changes: &QuestUpdate) -> Result<(), ApiError> {
        self.error = None;
        match api::quests::update(&self.http, quest_id, changes).await {
            Ok(quest) => {
                self.replace_listed(quest);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Mark a quest complete.
    ///
    /// Only the matching entry changes; list order is preserved.
    pub async fn mark_completed(&mut self, quest_id: &str) -> Result<(), ApiError> {
        self.error = None;
        match api::quests::mark_completed(&self.http, quest_id).await {
            Ok(quest) => {
                let id = quest.id.clone();
                let listed = self.quests.iter().any(|q| q.id == id);
                self.replace_listed(quest);
                if listed {
                    self.current = Some(id);
                }
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Delete a quest and drop it from the list.
    pub async fn delete(&mut self, quest_id: &str) -> Result<(), ApiError> {
        self.error = None;
        match api::quests::delete(&self.http, quest_id).await {
            Ok(()) => {
                self.quests.retain(|q| q.id != quest_id);
                if self.current.as_deref() == Some(quest_id) {
                    self.current = None;
                }
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // -- internals -----------------------------------------------------------

    /// Replace the listed record with the same id, or append a new one.
    fn upsert(&mut self, quest: Quest) {
        match self.quests.iter_mut().find(|q| q.id == quest.id) {
            Some(slot) => *slot = quest,
            None => self.quests.push(quest),
        }
    }

    /// Replace in place only; unknown ids are stale targets and ignored.
    fn replace_listed(&mut self, quest: Quest) {
        if let Some(slot) = self.quests.iter_mut().find(|q| q.id == quest.id) {
            *slot = quest;
        } else {
            tracing::debug!(quest_id = %quest.id, "ignoring update for unlisted quest");
        }
    }

    /// Record the display message and hand the error back to the caller.
    fn fail(&mut self, e: ApiError) -> ApiError {
        self.error = Some(e.to_string());
        e
    }
}
