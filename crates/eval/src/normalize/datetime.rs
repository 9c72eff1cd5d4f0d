//! Time entities: single instants for scheduling, intervals for searches.
//!
//! The recognizer resolves a time expression to either a `value` (an
//! instant plus its grain) or an `interval` (`from`/`to` bounds, `to`
//! exclusive). Resolved instants are rendered per grain, so a day reads
//! `Friday Jun 05, 2020` and a month `Jun 2020`.

use ::time::format_description::well_known::Rfc3339;
use ::time::macros::format_description;
use ::time::{Date, Duration, Month, OffsetDateTime};
use tally_core::{EntityCandidate, EntityKind, Grain, Slot, SlotUpdate};

use super::NormalizationError;

/// A single resolved instant ("pay it on Friday").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePoint {
    pub at: OffsetDateTime,
    pub grain: Grain,
    /// `at` rendered for its grain.
    pub time: String,
}

impl TimePoint {
    pub fn updates(&self) -> Vec<SlotUpdate> {
        vec![
            SlotUpdate::set(Slot::Time, self.time.clone()),
            SlotUpdate::set(Slot::Grain, self.grain),
        ]
    }
}

/// A half-open interval `[start, end)` ("spending last week").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub grain: Grain,
    pub start_time: String,
    pub end_time: String,
}

impl TimeInterval {
    pub fn updates(&self) -> Vec<SlotUpdate> {
        vec![
            SlotUpdate::set(Slot::StartTime, self.start_time.clone()),
            SlotUpdate::set(Slot::EndTime, self.end_time.clone()),
            SlotUpdate::set(Slot::Grain, self.grain),
        ]
    }
}

/// Normalize a time entity resolved to a single instant.
pub fn normalize_time_point(
    entity: Option<&EntityCandidate>,
) -> Result<TimePoint, NormalizationError> {
    let entity = time_entity(entity)?;
    match shape(entity)? {
        "value" => {
            let at = instant(entity)?;
            let grain = grain(entity.info("grain"))?;
            Ok(TimePoint {
                at,
                grain,
                time: render(at, grain)?,
            })
        }
        other => Err(NormalizationError::UnexpectedShape {
            expected: "single",
            found: other.to_string(),
        }),
    }
}

/// Normalize a time entity into an interval.
///
/// A single instant becomes `[value, value + one grain)`. An interval
/// missing either bound is rejected rather than half-filled.
pub fn normalize_time_interval(
    entity: Option<&EntityCandidate>,
) -> Result<TimeInterval, NormalizationError> {
    let entity = time_entity(entity)?;
    let (start, end, grain) = match shape(entity)? {
        "interval" => {
            let from = entity.info("from");
            let to = entity.info("to");
            let start = timestamp(bound(from).ok_or(NormalizationError::OpenInterval("from"))?)?;
            let end = timestamp(bound(to).ok_or(NormalizationError::OpenInterval("to"))?)?;
            let grain = grain(
                to.and_then(|b| b.get("grain"))
                    .or_else(|| from.and_then(|b| b.get("grain")))
                    .filter(|g| !g.is_null()),
            )?;
            if end <= start {
                return Err(NormalizationError::EmptyInterval);
            }
            (start, end, grain)
        }
        "value" => {
            let start = instant(entity)?;
            let grain = grain(entity.info("grain"))?;
            (start, advance(start, grain)?, grain)
        }
        other => {
            return Err(NormalizationError::UnexpectedShape {
                expected: "value or interval",
                found: other.to_string(),
            })
        }
    };
    Ok(TimeInterval {
        start,
        end,
        grain,
        start_time: render(start, grain)?,
        end_time: render(end, grain)?,
    })
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn time_entity(entity: Option<&EntityCandidate>) -> Result<&EntityCandidate, NormalizationError> {
    let entity = entity.ok_or(NormalizationError::Missing)?;
    if entity.kind() != Some(EntityKind::Time) {
        return Err(NormalizationError::UnsupportedKind(entity.tag.clone()));
    }
    Ok(entity)
}

fn shape(entity: &EntityCandidate) -> Result<&str, NormalizationError> {
    entity
        .info("type")
        .and_then(|t| t.as_str())
        .ok_or(NormalizationError::MissingField("type"))
}

fn instant(entity: &EntityCandidate) -> Result<OffsetDateTime, NormalizationError> {
    timestamp(
        entity
            .info("value")
            .ok_or(NormalizationError::MissingField("value"))?,
    )
}

fn bound(side: Option<&serde_json::Value>) -> Option<&serde_json::Value> {
    side.and_then(|b| b.get("value")).filter(|v| !v.is_null())
}

fn timestamp(raw: &serde_json::Value) -> Result<OffsetDateTime, NormalizationError> {
    let text = raw.as_str().ok_or_else(|| NormalizationError::BadTimestamp {
        value: raw.to_string(),
        reason: "not a string".to_string(),
    })?;
    OffsetDateTime::parse(text, &Rfc3339).map_err(|e| NormalizationError::BadTimestamp {
        value: text.to_string(),
        reason: e.to_string(),
    })
}

fn grain(raw: Option<&serde_json::Value>) -> Result<Grain, NormalizationError> {
    let raw = raw.ok_or(NormalizationError::MissingField("grain"))?;
    let text = raw
        .as_str()
        .ok_or_else(|| NormalizationError::UnknownGrain(raw.to_string()))?;
    text.parse::<Grain>()
        .map_err(NormalizationError::UnknownGrain)
}

/// The instant one grain after `start`. Months clamp to the last day.
fn advance(start: OffsetDateTime, grain: Grain) -> Result<OffsetDateTime, NormalizationError> {
    let next = match grain {
        Grain::Second => start.checked_add(Duration::SECOND),
        Grain::Minute => start.checked_add(Duration::MINUTE),
        Grain::Hour => start.checked_add(Duration::HOUR),
        Grain::Day => start.checked_add(Duration::DAY),
        Grain::Week => start.checked_add(Duration::WEEK),
        Grain::Month => add_months(start, 1),
        Grain::Quarter => add_months(start, 3),
        Grain::Year => add_months(start, 12),
    };
    next.ok_or(NormalizationError::OutOfRange)
}

fn add_months(at: OffsetDateTime, months: i32) -> Option<OffsetDateTime> {
    let date = at.date();
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 + months;
    let year = index.div_euclid(12);
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;
    let mut day = date.day();
    loop {
        if let Ok(shifted) = Date::from_calendar_date(year, month, day) {
            return Some(at.replace_date(shifted));
        }
        if day <= 28 {
            return None;
        }
        day -= 1;
    }
}

fn render(at: OffsetDateTime, grain: Grain) -> Result<String, NormalizationError> {
    let rendered = match grain {
        Grain::Second => at.format(&format_description!(
            "[hour repr:12]:[minute]:[second][period], [weekday] [month repr:short] [day], [year]"
        )),
        Grain::Minute => at.format(&format_description!(
            "[hour repr:12]:[minute][period], [weekday] [month repr:short] [day], [year]"
        )),
        Grain::Hour => at.format(&format_description!(
            "[hour repr:12][period], [weekday] [month repr:short] [day], [year]"
        )),
        Grain::Day | Grain::Week => {
            at.format(&format_description!("[weekday] [month repr:short] [day], [year]"))
        }
        Grain::Month | Grain::Quarter => {
            at.format(&format_description!("[month repr:short] [year]"))
        }
        Grain::Year => at.format(&format_description!("[year]")),
    };
    rendered.map_err(|e| NormalizationError::Render(e.to_string()))
}
