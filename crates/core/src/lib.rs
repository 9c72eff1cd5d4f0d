//! tally-core: the data model shared by the Tally engine and its drivers.
//!
//! - [`ConversationState`] -- typed slot snapshot, read once from the
//!   dialogue manager's JSON slot map
//! - [`SlotUpdate`] -- proposed mutations, applied atomically by the caller
//! - [`EntityCandidate`] -- recognizer output for the current turn
//! - [`Notice`] / [`Outcome`] -- what an engine call hands back
//! - [`StateError`] -- state the engine cannot trust

pub mod amount;
pub mod entity;
pub mod error;
pub mod form;
pub mod notice;
pub mod slot;
pub mod state;

pub use amount::{format_money, money_scale};
pub use entity::{EntityCandidate, EntityKind};
pub use error::StateError;
pub use form::Form;
pub use notice::{Notice, NoticeKey, Outcome};
pub use slot::{Grain, SearchType, Slot, SlotKind, SlotValue};
pub use state::{clear_all, ConversationState, SlotUpdate};
