//! Domain types and rules for the Side Quest client.
//!
//! Wire-faithful models for users, adventurers, and quests, the validated
//! request payloads the backend accepts, and the leveling rules used to
//! render progress without a server round-trip.

pub mod adventurer;
pub mod error;
pub mod leveling;
pub mod quest;
pub mod types;
pub mod user;
