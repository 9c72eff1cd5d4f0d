//! Slot validators.
//!
//! A validator looks at the value the form just filled, the turn's entity
//! candidates and the reference tables, and either accepts (proposing the
//! canonical slot values) or rejects (naming the notice to show and the
//! slots to reset). Validators never touch the state themselves.

use tally_core::{
    money_scale, ConversationState, EntityCandidate, EntityKind, Form, Notice, NoticeKey, Outcome,
    Slot, SlotUpdate,
};

use crate::normalize::{
    normalize_currency, normalize_time_interval, normalize_time_point, Money, DEFAULT_CURRENCY,
};
use crate::reference::ReferenceData;
use crate::resolve::{first_success, resolve, Attempt};

/// Amount chain: a currency entity first, then a bare number.
pub const MONEY_CHAIN: [Attempt<Money>; 2] = [
    Attempt {
        kind: EntityKind::AmountOfMoney,
        normalize: normalize_currency,
    },
    Attempt {
        kind: EntityKind::Number,
        normalize: normalize_currency,
    },
];

/// Everything a validator or submission handler sees of one turn.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    pub state: &'a ConversationState,
    pub entities: &'a [EntityCandidate],
    pub active_form: Option<Form>,
}

impl<'a> Turn<'a> {
    pub fn new(state: &'a ConversationState, entities: &'a [EntityCandidate]) -> Self {
        Turn {
            state,
            entities,
            active_form: None,
        }
    }

    pub fn in_form(mut self, form: Form) -> Self {
        self.active_form = Some(form);
        self
    }
}

/// Result of validating one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted { updates: Vec<SlotUpdate> },
    Rejected { notice: Notice, resets: Vec<SlotUpdate> },
}

impl Validation {
    fn accept(updates: Vec<SlotUpdate>) -> Self {
        Validation::Accepted { updates }
    }

    fn reject(key: NoticeKey, slot: Slot) -> Self {
        tracing::warn!(slot = %slot, notice = %key, "slot value rejected");
        Validation::Rejected {
            notice: Notice::new(key),
            resets: vec![SlotUpdate::clear(slot)],
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Validation::Accepted { .. })
    }
}

impl From<Validation> for Outcome {
    fn from(validation: Validation) -> Self {
        match validation {
            Validation::Accepted { updates } => Outcome::new(Vec::new(), updates),
            Validation::Rejected { notice, resets } => Outcome::new(vec![notice], resets),
        }
    }
}

fn money_updates(slot: Slot, money: Money) -> Vec<SlotUpdate> {
    vec![
        SlotUpdate::set(slot, money.amount),
        SlotUpdate::set(Slot::Currency, money.currency),
    ]
}

// ──────────────────────────────────────────────
// Validators
// ──────────────────────────────────────────────

/// Payment amount: a money entity, else a named alias ("minimum balance").
pub fn validate_payment_amount(turn: &Turn<'_>, reference: &dyn ReferenceData) -> Validation {
    match first_success(turn.entities, &MONEY_CHAIN) {
        Ok(money) => {
            tracing::info!(
                amount = %money.amount,
                currency = %money.currency,
                "payment amount accepted"
            );
            return Validation::accept(money_updates(Slot::PaymentAmount, money));
        }
        Err(err) => tracing::debug!(error = %err, "no payment amount entity, trying aliases"),
    }

    let Some(said) = turn.state.text(Slot::PaymentAmount) else {
        return Validation::reject(NoticeKey::NoPaymentAmount, Slot::PaymentAmount);
    };
    let alias = said.trim().to_lowercase();
    match reference.payment_amount(&alias) {
        Some(amount) => {
            tracing::info!(alias = %alias, amount = %amount, "payment alias accepted");
            Validation::accept(vec![
                SlotUpdate::set(Slot::PaymentAmount, money_scale(amount)),
                SlotUpdate::set(Slot::PaymentAmountType, format!(" (your {})", alias)),
                SlotUpdate::set(Slot::Currency, DEFAULT_CURRENCY),
            ])
        }
        None => Validation::reject(NoticeKey::NoPaymentAmount, Slot::PaymentAmount),
    }
}

/// Credit card: must name a known card. The value is kept as the user said it.
pub fn validate_credit_card(turn: &Turn<'_>, reference: &dyn ReferenceData) -> Validation {
    match turn.state.text(Slot::CreditCard) {
        Some(card) if reference.is_known_card(&card.trim().to_lowercase()) => {
            tracing::info!(card = %card, "credit card accepted");
            Validation::accept(vec![SlotUpdate::set(Slot::CreditCard, card)])
        }
        _ => Validation::reject(NoticeKey::NoCreditCard, Slot::CreditCard),
    }
}

pub fn validate_vendor_name(turn: &Turn<'_>, reference: &dyn ReferenceData) -> Validation {
    match turn.state.text(Slot::VendorName) {
        Some(vendor) if reference.is_known_vendor(&vendor.trim().to_lowercase()) => {
            tracing::info!(vendor = %vendor, "vendor accepted");
            Validation::accept(vec![SlotUpdate::set(Slot::VendorName, vendor)])
        }
        _ => Validation::reject(NoticeKey::NoVendorName, Slot::VendorName),
    }
}

/// Time: a single instant for payments, an interval for searches.
///
/// Outside those two forms there is nothing to resolve the time into, so
/// the validator proposes no updates.
pub fn validate_time(turn: &Turn<'_>) -> Validation {
    let entity = resolve(turn.entities, EntityKind::Time);
    let resolved = match turn.active_form {
        Some(Form::CcPayment) => normalize_time_point(entity).map(|point| point.updates()),
        Some(Form::TransactSearch) => normalize_time_interval(entity).map(|range| range.updates()),
        other => {
            tracing::debug!(form = ?other, "time validated outside a dated form");
            return Validation::accept(Vec::new());
        }
    };
    match resolved {
        Ok(updates) => {
            tracing::info!(slots = updates.len(), "time accepted");
            Validation::accept(updates)
        }
        Err(err) => {
            tracing::debug!(error = %err, "time did not normalize");
            Validation::reject(NoticeKey::NoTransactionDate, Slot::Time)
        }
    }
}

/// Transfer amount: the money chain only, no aliases.
pub fn validate_amount_of_money(turn: &Turn<'_>) -> Validation {
    match first_success(turn.entities, &MONEY_CHAIN) {
        Ok(money) => {
            tracing::info!(amount = %money.amount, "transfer amount accepted");
            Validation::accept(money_updates(Slot::AmountOfMoney, money))
        }
        Err(err) => {
            tracing::debug!(error = %err, "transfer amount did not normalize");
            Validation::reject(NoticeKey::NoPaymentAmount, Slot::AmountOfMoney)
        }
    }
}
