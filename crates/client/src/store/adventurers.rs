//! Adventurer list state.

use std::sync::Arc;

use sidequest_core::adventurer::{Adventurer, NewAdventurer};
use sidequest_core::types::EntityId;

use crate::api;
use crate::error::ApiError;
use crate::http::HttpClient;

/// What a quest completion changed, as computed by the backend.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOutcome {
    pub was_new_completion: bool,
    pub leveled_up: bool,
}

/// Holds the session user's adventurers.
pub struct AdventurerStore {
    http: Arc<HttpClient>,
    adventurers: Vec<Adventurer>,
    current: Option<EntityId>,
    error: Option<String>,
}

impl AdventurerStore {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            adventurers: Vec::new(),
            current: None,
            error: None,
        }
    }

    // -- state accessors -----------------------------------------------------

    pub fn adventurers(&self) -> &[Adventurer] {
        &self.adventurers
    }

    /// The selected adventurer, when the selection still references a list
    /// element.
    pub fn current(&self) -> Option<&Adventurer> {
        let id = self.current.as_deref()?;
        self.adventurers.iter().find(|a| a.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Select an adventurer locally. Fails when the id is not in the list,
    /// so the selection can never dangle.
    pub fn set_current(&mut self, id: &str) -> bool {
        if self.adventurers.iter().any(|a| a.id == id) {
            self.current = Some(id.to_string());
            true
        } else {
            false
        }
    }

    // -- operations ----------------------------------------------------------

    /// GET the full adventurer list, replacing local state.
    ///
    /// A selection that no longer references a listed adventurer is cleared.
    pub async fn fetch(&mut self) -> Result<(), ApiError> {
        self.error = None;
        match api::adventurers::list(&self.http).await {
            Ok(list) => {
                self.adventurers = list.adventurers;
                if let Some(id) = &self.current {
                    if !self.adventurers.iter().any(|a| &a.id == id) {
                        self.current = None;
                    }
                }
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Create an adventurer and select it.
    pub async fn create(&mut self, payload: &NewAdventurer) -> Result<&Adventurer, ApiError> {
        self.error = None;
        match api::adventurers::create(&self.http, payload).await {
            Ok(adventurer) => {
                let id = adventurer.id.clone();
                self.upsert(adventurer);
                self.current = Some(id);
                Ok(self.current().expect("created adventurer is listed"))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Fetch one adventurer, merge it into the list, and select it.
    pub async fn get(&mut self, adventurer_id: &str) -> Result<&Adventurer, ApiError> {
        self.error = None;
        match api::adventurers::get(&self.http, adventurer_id).await {
            Ok(adventurer) => {
                let id = adventurer.id.clone();
                self.upsert(adventurer);
                self.current = Some(id);
                Ok(self.current().expect("fetched adventurer is listed"))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Mark a quest complete for an adventurer and merge the re-computed
    /// adventurer record the backend returns.
    pub async fn complete_quest(
        &mut self,
        adventurer_id: &str,
        quest_id: &str,
    ) -> Result<CompletionOutcome, ApiError> {
        self.error = None;
        match api::adventurers::complete_quest(&self.http, adventurer_id, quest_id).await {
            Ok(completion) => {
                let id = completion.adventurer.id.clone();
                self.upsert(completion.adventurer);
                self.current = Some(id);
                Ok(CompletionOutcome {
                    was_new_completion: completion.was_new_completion,
                    leveled_up: completion.leveled_up,
                })
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // -- internals -----------------------------------------------------------

    /// Replace the listed record with the same id, or append a new one.
    fn upsert(&mut self, adventurer: Adventurer) {
        match self.adventurers.iter_mut().find(|a| a.id == adventurer.id) {
            Some(slot) => *slot = adventurer,
            None => self.adventurers.push(adventurer),
        }
    }

    /// Record the display message and hand the error back to the caller.
    fn fail(&mut self, e: ApiError) -> ApiError {
        self.error = Some(e.to_string());
        e
    }
}
