use crate::slot::Slot;

/// Errors raised while reading or updating conversation state.
///
/// These indicate that whatever manages the conversation handed over
/// state the engine cannot trust. They are never produced by user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A slot holds a value that cannot be read as its declared type.
    #[error("slot '{slot}' holds {found}, expected {expected}")]
    Corrupted {
        slot: Slot,
        expected: &'static str,
        found: String,
    },

    /// A slot required at this point of the conversation is empty.
    #[error("slot '{0}' is required but not set")]
    Missing(Slot),

    /// An update batch tried to store a value of the wrong type.
    #[error("update for slot '{slot}' carries {found}, expected {expected}")]
    UpdateMismatch {
        slot: Slot,
        expected: &'static str,
        found: &'static str,
    },

    /// Arithmetic on stored amounts left the representable range.
    #[error("arithmetic on slot '{0}' overflowed")]
    Overflow(Slot),

    /// A slot name the engine does not know.
    #[error("unknown slot: {0}")]
    UnknownSlot(String),

    /// A form name the engine does not know.
    #[error("unknown form: {0}")]
    UnknownForm(String),

    /// The slot map was not a JSON object.
    #[error("conversation state must be a JSON object")]
    NotAnObject,
}
