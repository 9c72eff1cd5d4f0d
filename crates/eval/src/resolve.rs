//! Entity resolution and ordered fallback chains.

use tally_core::{EntityCandidate, EntityKind};

use crate::normalize::NormalizationError;

/// Pick the best candidate of `kind`: highest confidence, earliest on ties.
///
/// No candidate of that kind is not an error; the caller decides what
/// absence means.
pub fn resolve(candidates: &[EntityCandidate], kind: EntityKind) -> Option<&EntityCandidate> {
    let mut best: Option<&EntityCandidate> = None;
    for candidate in candidates.iter().filter(|c| c.kind() == Some(kind)) {
        match best {
            Some(current) if current.rank() >= candidate.rank() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// One step of a fallback chain: the entity kind to look for and the
/// normalizer to run on it.
pub struct Attempt<T> {
    pub kind: EntityKind,
    pub normalize: fn(Option<&EntityCandidate>) -> Result<T, NormalizationError>,
}

/// Run `attempts` in order; the first one that normalizes wins.
///
/// Kinds absent from the turn are skipped. When every attempt fails, the
/// error of the last entity that was present is returned, or
/// [`NormalizationError::Missing`] if none was.
pub fn first_success<T>(
    candidates: &[EntityCandidate],
    attempts: &[Attempt<T>],
) -> Result<T, NormalizationError> {
    let mut failure = NormalizationError::Missing;
    for attempt in attempts {
        let Some(entity) = resolve(candidates, attempt.kind) else {
            tracing::debug!(kind = %attempt.kind, "no candidate of this kind");
            continue;
        };
        match (attempt.normalize)(Some(entity)) {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::debug!(kind = %attempt.kind, error = %err, "candidate did not normalize");
                failure = err;
            }
        }
    }
    Err(failure)
}
