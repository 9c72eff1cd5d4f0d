use std::fmt;
use std::str::FromStr;

use crate::error::StateError;
use crate::slot::Slot;

/// A user-facing task: a set of required slots plus a submission handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// Pay a credit card.
    CcPayment,
    /// Search past transactions.
    TransactSearch,
    /// Transfer money to a person.
    Transfer,
}

impl Form {
    pub const ALL: [Form; 3] = [Form::CcPayment, Form::TransactSearch, Form::Transfer];

    pub fn as_str(self) -> &'static str {
        match self {
            Form::CcPayment => "cc_payment_form",
            Form::TransactSearch => "transact_search_form",
            Form::Transfer => "transfer_form",
        }
    }

    /// Slots that must be filled before the form is submitted.
    pub fn required_slots(self) -> &'static [Slot] {
        match self {
            Form::CcPayment => &[
                Slot::CreditCard,
                Slot::PaymentAmount,
                Slot::Time,
                Slot::Confirm,
            ],
            Form::TransactSearch => &[Slot::SearchType, Slot::Time],
            Form::Transfer => &[Slot::Person, Slot::AmountOfMoney, Slot::Confirm],
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Form {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Form::ALL
            .into_iter()
            .find(|form| form.as_str() == s)
            .ok_or_else(|| StateError::UnknownForm(s.to_string()))
    }
}
