//! Typed endpoint bindings.
//!
//! One module per resource; each endpoint gets exactly one request and one
//! response schema. A payload that does not match its schema is an error --
//! there is no alternate-envelope guessing.

pub mod adventurers;
pub mod auth;
pub mod quests;
pub mod users;
