//! Tally engine: slot validation and form submission for a banking
//! assistant.
//!
//! One call handles one turn. The caller supplies a state snapshot, the
//! turn's entity candidates and the active form; the engine answers with
//! an [`Outcome`]: the notices to render and the slot updates to apply as
//! one batch. The engine never mutates the state it is given.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use tally_eval::Engine;
//!
//! let engine = Engine::default();
//! let outcome = engine
//!     .run_json(
//!         "validate_credit_card",
//!         &json!({ "credit_card": "Iron Bank" }),
//!         &json!([]),
//!         Some("cc_payment_form"),
//!     )
//!     .unwrap();
//! assert!(outcome.notices.is_empty());
//! ```

pub mod normalize;
pub mod reference;
pub mod resolve;
pub mod submit;
pub mod validate;

use std::fmt;
use std::str::FromStr;

use tally_core::{ConversationState, EntityCandidate, Form, Outcome, StateError};

pub use normalize::{Money, NormalizationError, TimeInterval, TimePoint};
pub use reference::{ReferenceData, ReferenceError, ReferenceTables, StaticReference, Transaction};
pub use resolve::{first_success, resolve, Attempt};
pub use submit::Completion;
pub use validate::{Turn, Validation};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors that escape the engine. Rejected slot values are not errors;
/// they come back as notices.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("invalid entity list: {0}")]
    Entities(#[from] serde_json::Error),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

// ──────────────────────────────────────────────
// Actions
// ──────────────────────────────────────────────

/// The actions the dialogue manager can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ValidatePaymentAmount,
    ValidateCreditCard,
    ValidateTime,
    ValidateAmountOfMoney,
    ValidateVendorName,
    SubmitCcPayment,
    SubmitTransactSearch,
    SubmitTransfer,
    AccountBalance,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::ValidatePaymentAmount,
        Action::ValidateCreditCard,
        Action::ValidateTime,
        Action::ValidateAmountOfMoney,
        Action::ValidateVendorName,
        Action::SubmitCcPayment,
        Action::SubmitTransactSearch,
        Action::SubmitTransfer,
        Action::AccountBalance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::ValidatePaymentAmount => "validate_payment_amount",
            Action::ValidateCreditCard => "validate_credit_card",
            Action::ValidateTime => "validate_time",
            Action::ValidateAmountOfMoney => "validate_amount_of_money",
            Action::ValidateVendorName => "validate_vendor_name",
            Action::SubmitCcPayment => "action_submit_cc_payment",
            Action::SubmitTransactSearch => "action_submit_transact_search",
            Action::SubmitTransfer => "action_submit_transfer",
            Action::AccountBalance => "action_account_balance",
        }
    }

    /// The form a submission action completes.
    pub fn form(self) -> Option<Form> {
        match self {
            Action::SubmitCcPayment => Some(Form::CcPayment),
            Action::SubmitTransactSearch => Some(Form::TransactSearch),
            Action::SubmitTransfer => Some(Form::Transfer),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| EngineError::UnknownAction(s.to_string()))
    }
}

// ──────────────────────────────────────────────
// Engine
// ──────────────────────────────────────────────

/// Dispatches actions against one reference provider.
///
/// The engine holds no per-conversation data, so a single instance can be
/// shared by every conversation.
#[derive(Debug, Clone)]
pub struct Engine<R: ReferenceData = StaticReference> {
    reference: R,
}

impl Default for Engine<StaticReference> {
    fn default() -> Self {
        Engine::new(StaticReference::default())
    }
}

impl Engine<StaticReference> {
    /// An engine over configured tables instead of the built-in ones.
    pub fn from_tables(tables: ReferenceTables) -> Result<Self, EngineError> {
        Ok(Engine::new(StaticReference::new(tables)?))
    }
}

impl<R: ReferenceData> Engine<R> {
    pub fn new(reference: R) -> Self {
        Engine { reference }
    }

    pub fn reference(&self) -> &R {
        &self.reference
    }

    /// Run one action for one turn.
    pub fn run(&self, action: Action, turn: &Turn<'_>) -> Result<Outcome, EngineError> {
        tracing::debug!(action = %action, form = ?turn.active_form, "running action");
        let reference: &dyn ReferenceData = &self.reference;
        let outcome: Outcome = match action {
            Action::ValidatePaymentAmount => {
                validate::validate_payment_amount(turn, reference).into()
            }
            Action::ValidateCreditCard => validate::validate_credit_card(turn, reference).into(),
            Action::ValidateTime => validate::validate_time(turn).into(),
            Action::ValidateAmountOfMoney => validate::validate_amount_of_money(turn).into(),
            Action::ValidateVendorName => validate::validate_vendor_name(turn, reference).into(),
            Action::SubmitCcPayment => submit::submit_cc_payment(turn.state),
            Action::SubmitTransactSearch => submit::submit_transact_search(turn.state, reference)?,
            Action::SubmitTransfer => submit::submit_transfer(turn.state)?,
            Action::AccountBalance => submit::account_balance(turn.state, reference)?,
        };
        Ok(outcome)
    }

    /// Run an action on loose JSON input: the dialogue manager's slot map
    /// and entity list. `null` entities count as none.
    pub fn run_json(
        &self,
        action: &str,
        state: &serde_json::Value,
        entities: &serde_json::Value,
        form: Option<&str>,
    ) -> Result<Outcome, EngineError> {
        let action: Action = action.parse()?;
        let state = ConversationState::from_json(state).inspect_err(|err| {
            tracing::warn!(error = %err, "conversation state is corrupted");
        })?;
        let entities: Vec<EntityCandidate> = if entities.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(entities.clone())?
        };
        let mut turn = Turn::new(&state, &entities);
        if let Some(form) = form {
            turn = turn.in_form(form.parse::<Form>()?);
        }
        self.run(action, &turn)
    }
}
