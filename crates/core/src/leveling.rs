//! Level progression rules.
//!
//! Mirrors the backend's calculator so lists can render progress locally;
//! the server remains authoritative and the client overwrites these numbers
//! with whatever a completion response returns.

use crate::error::CoreError;

/// Experience required to advance past the given level.
///
/// The curve is linear: level n requires `n * 100` experience.
pub fn experience_required(level: i64) -> Result<i64, CoreError> {
    if level < 1 {
        return Err(CoreError::Validation(
            "Level must be greater than 0".to_string(),
        ));
    }
    Ok(level * 100)
}

/// Whether an adventurer at `level` with `experience_gain` accumulated
/// experience has earned the next level.
pub fn has_leveled_up(level: i64, experience_gain: i64) -> Result<bool, CoreError> {
    if experience_gain < 0 {
        return Err(CoreError::Validation(
            "Experience cannot be negative".to_string(),
        ));
    }
    let required = experience_required(level)?;
    Ok(experience_gain >= required)
}

/// Progress toward the next level as a percentage (0.0-100.0).
///
/// Returns `None` when the requirement is unknown or zero.
pub fn progress_percent(experience: i64, required: i64) -> Option<f64> {
    if required <= 0 {
        return None;
    }
    let pct = (experience as f64 / required as f64) * 100.0;
    Some(pct.min(100.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
