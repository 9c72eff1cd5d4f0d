//! Normalizers: raw recognizer entities to canonical slot values.
//!
//! Each normalizer takes the resolved entity (or `None` when the turn had
//! no entity of the requested kind) and either produces a canonical value
//! or a [`NormalizationError`]. Failure is always recoverable: validators
//! turn it into a rejection notice.

pub mod datetime;
pub mod money;

pub use datetime::{normalize_time_interval, normalize_time_point, TimeInterval, TimePoint};
pub use money::{normalize_currency, Money, DEFAULT_CURRENCY};

/// Why an entity could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    /// The turn carried no entity of the requested kind.
    #[error("no usable entity in the current turn")]
    Missing,

    /// The entity is of a kind this normalizer does not handle.
    #[error("entity '{0}' cannot be normalized here")]
    UnsupportedKind(String),

    /// A field the normalizer needs is not in the entity.
    #[error("entity is missing '{0}'")]
    MissingField(&'static str),

    #[error("'{0}' is not a numeric amount")]
    NotNumeric(String),

    #[error("'{value}' is not a timestamp: {reason}")]
    BadTimestamp { value: String, reason: String },

    #[error("unknown grain '{0}'")]
    UnknownGrain(String),

    /// A time entity of the other shape (value vs. interval).
    #[error("expected a {expected} time, got '{found}'")]
    UnexpectedShape {
        expected: &'static str,
        found: String,
    },

    /// An interval with only one bound ("since Monday").
    #[error("interval has no '{0}' bound")]
    OpenInterval(&'static str),

    #[error("interval ends before it starts")]
    EmptyInterval,

    #[error("time arithmetic left the supported range")]
    OutOfRange,

    #[error("could not render time: {0}")]
    Render(String),
}
