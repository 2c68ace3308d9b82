/// Entity identifiers are backend-issued opaque strings (ULID/UUID shaped).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
