//! The baseline dataset a fresh board is seeded from.
//!
//! A board ships with a bundled dataset. Projects may point
//! `[board] baseline` at their own file instead; it goes through the same
//! normalizer as an import, so any supported shape works.

use std::path::Path;

use tracing::debug;

use crate::error::{CorkboardError, Result};
use crate::model::{Clock, Issue};
use crate::normalize::normalize_text;

const BUNDLED: &str = include_str!("../data/baseline.json");

/// The bundled dataset, normalized.
///
/// # Errors
///
/// Only if the bundled file is not valid JSON.
pub fn bundled(clock: &impl Clock) -> Result<Vec<Issue>> {
    normalize_text(BUNDLED, &clock.now())
}

/// Load the baseline from `path`, or the bundled dataset when `None`.
///
/// # Errors
///
/// [`CorkboardError::Config`] if the file cannot be read, or
/// [`CorkboardError::Parse`] if it is not JSON.
pub fn load(path: Option<&Path>, clock: &impl Clock) -> Result<Vec<Issue>> {
    let Some(path) = path else {
        return bundled(clock);
    };
    let text = std::fs::read_to_string(path).map_err(|err| {
        CorkboardError::Config(format!("cannot read baseline {}: {err}", path.display()))
    })?;
    let issues = normalize_text(&text, &clock.now())?;
    debug!(path = %path.display(), count = issues.len(), "loaded baseline");
    Ok(issues)
}
