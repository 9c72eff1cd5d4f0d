//! Conversation state and slot-update batches.
//!
//! The dialogue manager keeps slots as loose JSON. [`ConversationState::from_json`]
//! is the single point where those values become typed; everything past
//! it works with [`SlotValue`]s. Validators and submission handlers never
//! mutate state: they return [`SlotUpdate`]s which the caller applies.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::amount::amount_from_json;
use crate::error::StateError;
use crate::form::Form;
use crate::slot::{Grain, SearchType, Slot, SlotKind, SlotValue};

// ──────────────────────────────────────────────
// Slot updates
// ──────────────────────────────────────────────

/// A single slot mutation proposed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotUpdate {
    Set(Slot, SlotValue),
    Clear(Slot),
}

impl SlotUpdate {
    pub fn set(slot: Slot, value: impl Into<SlotValue>) -> Self {
        SlotUpdate::Set(slot, value.into())
    }

    pub fn clear(slot: Slot) -> Self {
        SlotUpdate::Clear(slot)
    }

    pub fn slot(&self) -> Slot {
        match self {
            SlotUpdate::Set(slot, _) | SlotUpdate::Clear(slot) => *slot,
        }
    }

    /// The new value, or `None` for a clear.
    pub fn value(&self) -> Option<&SlotValue> {
        match self {
            SlotUpdate::Set(_, value) => Some(value),
            SlotUpdate::Clear(_) => None,
        }
    }
}

/// Clear every slot in `slots`, in order.
pub fn clear_all(slots: &[Slot]) -> Vec<SlotUpdate> {
    slots.iter().copied().map(SlotUpdate::Clear).collect()
}

/// Serialized as `{"slot": "...", "value": ...}` with `null` for a clear,
/// which is how the dialogue manager's `SlotSet` events look.
impl Serialize for SlotUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("SlotUpdate", 2)?;
        st.serialize_field("slot", &self.slot())?;
        st.serialize_field("value", &self.value().map(SlotValue::to_json))?;
        st.end()
    }
}

// ──────────────────────────────────────────────
// Conversation state
// ──────────────────────────────────────────────

/// Typed snapshot of one conversation's slots. Absent slots are unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    slots: BTreeMap<Slot, SlotValue>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a slot map as kept by the dialogue manager.
    ///
    /// `null` means unset. Slot names the engine does not own (such as
    /// `requested_slot`) are skipped. A value that does not fit its slot's
    /// type is state corruption.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, StateError> {
        let obj = value.as_object().ok_or(StateError::NotAnObject)?;
        let mut state = ConversationState::new();
        for (name, raw) in obj {
            let slot = match name.parse::<Slot>() {
                Ok(slot) => slot,
                Err(_) => {
                    tracing::debug!(slot = %name, "ignoring slot not owned by the engine");
                    continue;
                }
            };
            if let Some(value) = coerce(slot, raw)? {
                state.slots.insert(slot, value);
            }
        }
        Ok(state)
    }

    /// Write the state back out as a slot map.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .slots
            .iter()
            .map(|(slot, value)| (slot.as_str().to_string(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Store a raw value for a slot, the way the dialogue manager fills a
    /// slot from user input before asking for validation.
    pub fn fill(&mut self, name: &str, raw: &serde_json::Value) -> Result<(), StateError> {
        let slot = name.parse::<Slot>()?;
        match coerce(slot, raw)? {
            Some(value) => self.slots.insert(slot, value),
            None => self.slots.remove(&slot),
        };
        Ok(())
    }

    /// Apply an update batch atomically.
    ///
    /// Every update is type-checked before any is applied; on error the
    /// state is unchanged. Clearing an unset slot is a no-op.
    pub fn apply(&mut self, updates: &[SlotUpdate]) -> Result<(), StateError> {
        for update in updates {
            if let SlotUpdate::Set(slot, value) = update {
                let kind = slot.kind();
                if !value.fits(kind) {
                    return Err(StateError::UpdateMismatch {
                        slot: *slot,
                        expected: kind.describe(),
                        found: value.type_name(),
                    });
                }
            }
        }
        for update in updates {
            match update {
                SlotUpdate::Set(slot, value) => {
                    self.slots.insert(*slot, value.clone());
                }
                SlotUpdate::Clear(slot) => {
                    self.slots.remove(slot);
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, slot: Slot) -> Option<&SlotValue> {
        self.slots.get(&slot)
    }

    pub fn is_set(&self, slot: Slot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &SlotValue)> {
        self.slots.iter().map(|(slot, value)| (*slot, value))
    }

    /// Text content of a slot; `None` when unset or not text.
    pub fn text(&self, slot: Slot) -> Option<&str> {
        match self.slots.get(&slot) {
            Some(SlotValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Numeric content of a slot; `None` when unset or not an amount.
    pub fn amount(&self, slot: Slot) -> Option<Decimal> {
        match self.slots.get(&slot) {
            Some(SlotValue::Amount(d)) => Some(*d),
            _ => None,
        }
    }

    /// An amount that must be present, for use once a form is complete.
    pub fn require_amount(&self, slot: Slot) -> Result<Decimal, StateError> {
        match self.slots.get(&slot) {
            Some(SlotValue::Amount(d)) => Ok(*d),
            Some(other) => Err(StateError::Corrupted {
                slot,
                expected: SlotKind::Amount.describe(),
                found: format!("'{}'", other),
            }),
            None => Err(StateError::Missing(slot)),
        }
    }

    /// The confirm flag. Unset reads as `false`.
    pub fn confirmed(&self) -> bool {
        matches!(self.slots.get(&Slot::Confirm), Some(SlotValue::Flag(true)))
    }

    pub fn grain(&self) -> Option<Grain> {
        match self.slots.get(&Slot::Grain) {
            Some(SlotValue::Grain(g)) => Some(*g),
            _ => None,
        }
    }

    pub fn search_type(&self) -> Option<SearchType> {
        match self.slots.get(&Slot::SearchType) {
            Some(SlotValue::Search(t)) => Some(*t),
            _ => None,
        }
    }

    /// Required slots of `form` that are still unset.
    pub fn missing_slots(&self, form: Form) -> Vec<Slot> {
        form.required_slots()
            .iter()
            .copied()
            .filter(|slot| !self.is_set(*slot))
            .collect()
    }
}

/// Convert a loose JSON value into the canonical value for `slot`.
fn coerce(slot: Slot, raw: &serde_json::Value) -> Result<Option<SlotValue>, StateError> {
    use serde_json::Value as J;

    if raw.is_null() {
        return Ok(None);
    }
    let kind = slot.kind();
    let corrupted = || StateError::Corrupted {
        slot,
        expected: kind.describe(),
        found: raw.to_string(),
    };

    let value = match (kind, raw) {
        (SlotKind::Text, J::String(s)) => SlotValue::Text(s.clone()),
        (SlotKind::Text, J::Number(n)) => SlotValue::Text(n.to_string()),
        (SlotKind::Amount, _) => SlotValue::Amount(amount_from_json(raw).ok_or_else(corrupted)?),
        (SlotKind::AmountOrText, J::Number(_)) => {
            SlotValue::Amount(amount_from_json(raw).ok_or_else(corrupted)?)
        }
        (SlotKind::AmountOrText, J::String(s)) => match amount_from_json(raw) {
            Some(amount) => SlotValue::Amount(amount),
            None => SlotValue::Text(s.clone()),
        },
        (SlotKind::Flag, J::Bool(b)) => SlotValue::Flag(*b),
        (SlotKind::Grain, J::String(s)) => SlotValue::Grain(s.parse().map_err(|_| corrupted())?),
        (SlotKind::SearchType, J::String(s)) => {
            SlotValue::Search(s.parse().map_err(|_| corrupted())?)
        }
        _ => return Err(corrupted()),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_typed_values_and_skips_foreign_slots() {
        let state = ConversationState::from_json(&json!({
            "credit_card": "Iron Bank",
            "account_balance": "550",
            "amount_transferred": 100,
            "confirm": true,
            "grain": "day",
            "search_type": "spend",
            "requested_slot": "time",
            "time": null
        }))
        .unwrap();

        assert_eq!(state.text(Slot::CreditCard), Some("Iron Bank"));
        assert_eq!(state.amount(Slot::AccountBalance), Some(Decimal::from(550)));
        assert_eq!(state.amount(Slot::AmountTransferred), Some(Decimal::from(100)));
        assert!(state.confirmed());
        assert_eq!(state.grain(), Some(Grain::Day));
        assert_eq!(state.search_type(), Some(SearchType::Spend));
        assert!(!state.is_set(Slot::Time));
        assert_eq!(state.len(), 6);
    }

    #[test]
    fn payment_amount_keeps_text_until_validated() {
        let state = ConversationState::from_json(&json!({
            "payment_amount": "current balance",
            "amount_of_money": "20"
        }))
        .unwrap();
        assert_eq!(state.text(Slot::PaymentAmount), Some("current balance"));
        assert_eq!(state.amount(Slot::AmountOfMoney), Some(Decimal::from(20)));
    }

    #[test]
    fn non_numeric_balance_is_corruption() {
        let err = ConversationState::from_json(&json!({ "account_balance": "lots" })).unwrap_err();
        assert!(matches!(
            err,
            StateError::Corrupted { slot: Slot::AccountBalance, .. }
        ));
    }

    #[test]
    fn wrong_shapes_are_corruption() {
        assert!(ConversationState::from_json(&json!({ "confirm": "yes" })).is_err());
        assert!(ConversationState::from_json(&json!({ "grain": "fortnight" })).is_err());
        assert!(ConversationState::from_json(&json!({ "search_type": 3 })).is_err());
        assert_eq!(
            ConversationState::from_json(&json!(["not", "a", "map"])),
            Err(StateError::NotAnObject)
        );
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut state = ConversationState::new();
        state.fill("credit_card", &json!("gringots")).unwrap();

        let batch = vec![
            SlotUpdate::clear(Slot::CreditCard),
            SlotUpdate::set(Slot::AccountBalance, "not a number"),
        ];
        let err = state.apply(&batch).unwrap_err();
        assert!(matches!(
            err,
            StateError::UpdateMismatch { slot: Slot::AccountBalance, .. }
        ));
        assert_eq!(state.text(Slot::CreditCard), Some("gringots"));
    }

    #[test]
    fn clearing_an_unset_slot_is_a_no_op() {
        let mut state = ConversationState::new();
        state
            .apply(&clear_all(&[Slot::Time, Slot::Grain, Slot::Time]))
            .unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn apply_sets_a_multi_slot_batch() {
        let mut state = ConversationState::new();
        state
            .apply(&[
                SlotUpdate::set(Slot::StartTime, "Monday Jun 01, 2020"),
                SlotUpdate::set(Slot::EndTime, "Monday Jun 08, 2020"),
                SlotUpdate::set(Slot::Grain, Grain::Week),
            ])
            .unwrap();
        assert_eq!(state.text(Slot::StartTime), Some("Monday Jun 01, 2020"));
        assert_eq!(state.text(Slot::EndTime), Some("Monday Jun 08, 2020"));
        assert_eq!(state.grain(), Some(Grain::Week));
    }

    #[test]
    fn fill_with_null_unsets() {
        let mut state = ConversationState::new();
        state.fill("vendor_name", &json!("amazon")).unwrap();
        state.fill("vendor_name", &json!(null)).unwrap();
        assert!(!state.is_set(Slot::VendorName));
        assert_eq!(
            state.fill("requested_slot", &json!("x")),
            Err(StateError::UnknownSlot("requested_slot".to_string()))
        );
    }

    #[test]
    fn require_amount_distinguishes_missing_from_corrupted() {
        let mut state = ConversationState::new();
        assert_eq!(
            state.require_amount(Slot::AmountOfMoney),
            Err(StateError::Missing(Slot::AmountOfMoney))
        );
        state.fill("amount_of_money", &json!("a lot")).unwrap();
        assert!(matches!(
            state.require_amount(Slot::AmountOfMoney),
            Err(StateError::Corrupted { .. })
        ));
    }

    #[test]
    fn to_json_round_trips() {
        let raw = json!({
            "account_balance": "450.00",
            "confirm": false,
            "grain": "month",
            "PERSON": "Lisa"
        });
        let state = ConversationState::from_json(&raw).unwrap();
        assert_eq!(state.to_json(), raw);
    }

    #[test]
    fn updates_serialize_like_slot_events() {
        let set = SlotUpdate::set(Slot::PaymentAmount, Decimal::new(1250, 2));
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({ "slot": "payment_amount", "value": "12.50" })
        );
        assert_eq!(
            serde_json::to_value(SlotUpdate::clear(Slot::Person)).unwrap(),
            json!({ "slot": "PERSON", "value": null })
        );
    }
}
