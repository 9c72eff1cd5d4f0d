//! Form submission handlers.
//!
//! Each handler runs once its form is complete, picks the notice for how
//! the form ended and resets every slot the form owns, on every branch.

use rust_decimal::Decimal;
use tally_core::{
    clear_all, format_money, money_scale, ConversationState, Form, Notice, NoticeKey, Outcome,
    SearchType, Slot, SlotUpdate, StateError,
};

use crate::reference::ReferenceData;

/// How a form (or the balance action) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    PaymentScheduled,
    PaymentCancelled,
    Searching(SearchType),
    Found(SearchType),
    TransferComplete,
    TransferCancelled,
    BalanceChanged,
    BalanceReported,
}

impl Completion {
    pub fn notice_key(self) -> NoticeKey {
        match self {
            Completion::PaymentScheduled => NoticeKey::CcPayScheduled,
            Completion::PaymentCancelled => NoticeKey::CcPayCancelled,
            Completion::Searching(SearchType::Spend) => NoticeKey::SearchingSpendTransactions,
            Completion::Searching(SearchType::Deposit) => NoticeKey::SearchingDepositTransactions,
            Completion::Found(SearchType::Spend) => NoticeKey::FoundSpendTransactions,
            Completion::Found(SearchType::Deposit) => NoticeKey::FoundDepositTransactions,
            Completion::TransferComplete => NoticeKey::TransferComplete,
            Completion::TransferCancelled => NoticeKey::TransferCancelled,
            Completion::BalanceChanged => NoticeKey::ChangedAccountBalance,
            Completion::BalanceReported => NoticeKey::AccountBalance,
        }
    }

    fn notice(self) -> Notice {
        Notice::new(self.notice_key())
    }
}

const PAYMENT_SLOTS: [Slot; 5] = [
    Slot::CreditCard,
    Slot::PaymentAmount,
    Slot::Confirm,
    Slot::Time,
    Slot::Grain,
];

const SEARCH_SLOTS: [Slot; 5] = [
    Slot::Time,
    Slot::StartTime,
    Slot::EndTime,
    Slot::Grain,
    Slot::SearchType,
];

const TRANSFER_SLOTS: [Slot; 3] = [Slot::Person, Slot::AmountOfMoney, Slot::Confirm];

fn warn_if_incomplete(state: &ConversationState, form: Form) {
    let missing = state.missing_slots(form);
    if !missing.is_empty() {
        let missing: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
        tracing::warn!(form = %form, missing = ?missing, "submitting an incomplete form");
    }
}

// ──────────────────────────────────────────────
// Handlers
// ──────────────────────────────────────────────

/// Schedule or cancel a card payment.
pub fn submit_cc_payment(state: &ConversationState) -> Outcome {
    warn_if_incomplete(state, Form::CcPayment);
    let completion = if state.confirmed() {
        Completion::PaymentScheduled
    } else {
        Completion::PaymentCancelled
    };
    tracing::info!(form = %Form::CcPayment, outcome = ?completion, "form completed");
    Outcome::new(vec![completion.notice()], clear_all(&PAYMENT_SLOTS))
}

/// Count and total the matching transactions.
///
/// `vendor_name` narrows the search when set and is left in place for the
/// next search.
pub fn submit_transact_search(
    state: &ConversationState,
    reference: &dyn ReferenceData,
) -> Result<Outcome, StateError> {
    warn_if_incomplete(state, Form::TransactSearch);
    let category = state
        .search_type()
        .ok_or(StateError::Missing(Slot::SearchType))?;
    let vendor = state.text(Slot::VendorName);

    let vendor_key = vendor.map(|v| v.trim().to_lowercase());
    let matching = reference.transactions(category, vendor_key.as_deref());
    let total = matching
        .iter()
        .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.amount))
        .ok_or(StateError::Overflow(Slot::SearchType))?;
    tracing::info!(
        category = %category,
        vendor = vendor.unwrap_or(""),
        count = matching.len(),
        total = %total,
        "transactions searched"
    );

    let fill = |completion: Completion| {
        completion
            .notice()
            .with("numtransacts", matching.len())
            .with("total", format_money(total))
            .with("start_time", state.text(Slot::StartTime).unwrap_or(""))
            .with("end_time", state.text(Slot::EndTime).unwrap_or(""))
            .with("grain", state.grain().map(|g| g.as_str()).unwrap_or(""))
            .with(
                "vendor_name",
                vendor.map(|v| format!(" with {}", v)).unwrap_or_default(),
            )
    };
    let notices = vec![
        fill(Completion::Searching(category)),
        fill(Completion::Found(category)),
    ];
    Ok(Outcome::new(notices, clear_all(&SEARCH_SLOTS)))
}

/// Complete or cancel a transfer. A completed transfer leaves its amount in
/// `amount_transferred` for the balance action to pick up.
pub fn submit_transfer(state: &ConversationState) -> Result<Outcome, StateError> {
    warn_if_incomplete(state, Form::Transfer);
    let mut updates = clear_all(&TRANSFER_SLOTS);
    let completion = if state.confirmed() {
        let amount = state.require_amount(Slot::AmountOfMoney)?;
        updates.push(SlotUpdate::set(Slot::AmountTransferred, money_scale(amount)));
        Completion::TransferComplete
    } else {
        Completion::TransferCancelled
    };
    tracing::info!(form = %Form::Transfer, outcome = ?completion, "form completed");
    Ok(Outcome::new(vec![completion.notice()], updates))
}

/// Report the balance, first settling a pending transfer if there is one.
pub fn account_balance(
    state: &ConversationState,
    reference: &dyn ReferenceData,
) -> Result<Outcome, StateError> {
    let initial = state
        .amount(Slot::AccountBalance)
        .unwrap_or_else(|| reference.opening_balance());
    let pending = state
        .amount(Slot::AmountTransferred)
        .filter(|amount| !amount.is_zero());

    let Some(transferred) = pending else {
        let notice = Completion::BalanceReported
            .notice()
            .with("init_account_balance", format_money(initial));
        return Ok(Outcome::new(vec![notice], vec![SlotUpdate::clear(Slot::PaymentAmount)]));
    };

    let balance = initial
        .checked_sub(transferred)
        .map(money_scale)
        .ok_or(StateError::Overflow(Slot::AccountBalance))?;
    tracing::info!(from = %initial, to = %balance, "account balance changed");
    let notice = Completion::BalanceChanged
        .notice()
        .with("init_account_balance", format_money(initial))
        .with("account_balance", format_money(balance));
    Ok(Outcome::new(
        vec![notice],
        vec![
            SlotUpdate::clear(Slot::PaymentAmount),
            SlotUpdate::set(Slot::AccountBalance, balance),
            SlotUpdate::clear(Slot::AmountTransferred),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::StaticReference;
    use serde_json::json;

    fn state(slots: serde_json::Value) -> ConversationState {
        ConversationState::from_json(&slots).unwrap()
    }

    // ──────────────────────────────────────────────
    // Payment
    // ──────────────────────────────────────────────

    #[test]
    fn confirmed_payment_is_scheduled_and_cleared() {
        let state = state(json!({
            "credit_card": "iron bank",
            "payment_amount": "85.00",
            "time": "Friday Jun 05, 2020",
            "grain": "day",
            "confirm": true
        }));
        let outcome = submit_cc_payment(&state);
        assert_eq!(outcome.notice_keys(), vec![NoticeKey::CcPayScheduled]);
        assert_eq!(outcome.updates, clear_all(&PAYMENT_SLOTS));
    }

    #[test]
    fn unconfirmed_payment_is_cancelled_with_the_same_resets() {
        let outcome = submit_cc_payment(&state(json!({ "confirm": false })));
        assert_eq!(outcome.notice_keys(), vec![NoticeKey::CcPayCancelled]);
        assert_eq!(outcome.updates.len(), PAYMENT_SLOTS.len());
    }

    // ──────────────────────────────────────────────
    // Search
    // ──────────────────────────────────────────────

    #[test]
    fn vendor_search_counts_and_totals() {
        let state = state(json!({
            "search_type": "spend",
            "vendor_name": "Amazon",
            "start_time": "May 2020",
            "end_time": "Jun 2020",
            "grain": "month"
        }));
        let outcome = submit_transact_search(&state, &StaticReference::default()).unwrap();
        assert_eq!(
            outcome.notice_keys(),
            vec![
                NoticeKey::SearchingSpendTransactions,
                NoticeKey::FoundSpendTransactions
            ]
        );
        let found = &outcome.notices[1];
        assert_eq!(found.param("numtransacts"), Some("3"));
        assert_eq!(found.param("total"), Some("94.80"));
        assert_eq!(found.param("vendor_name"), Some(" with Amazon"));
        assert_eq!(found.param("start_time"), Some("May 2020"));
        assert_eq!(found.param("grain"), Some("month"));
        assert_eq!(outcome.updates, clear_all(&SEARCH_SLOTS));
        assert!(outcome.update_for(Slot::VendorName).is_none());
    }

    #[test]
    fn search_without_vendor_covers_the_category() {
        let state = state(json!({ "search_type": "spend" }));
        let outcome = submit_transact_search(&state, &StaticReference::default()).unwrap();
        let found = &outcome.notices[1];
        assert_eq!(found.param("numtransacts"), Some("4"));
        assert_eq!(found.param("total"), Some("224.90"));
        assert_eq!(found.param("vendor_name"), Some(""));
        assert_eq!(found.param("end_time"), Some(""));
    }

    #[test]
    fn empty_selection_totals_zero() {
        let state = state(json!({ "search_type": "deposit", "vendor_name": "starbucks" }));
        let outcome = submit_transact_search(&state, &StaticReference::default()).unwrap();
        assert_eq!(
            outcome.notice_keys(),
            vec![
                NoticeKey::SearchingDepositTransactions,
                NoticeKey::FoundDepositTransactions
            ]
        );
        assert_eq!(outcome.notices[0].param("numtransacts"), Some("0"));
        assert_eq!(outcome.notices[0].param("total"), Some("0.00"));
    }

    #[test]
    fn search_total_past_decimal_range_is_an_error() {
        let mut tables = crate::reference::ReferenceTables::default();
        tables.transactions.insert(
            SearchType::Spend,
            [(
                "amazon".to_string(),
                vec![
                    crate::reference::Transaction::new(Decimal::MAX),
                    crate::reference::Transaction::new(Decimal::ONE),
                ],
            )]
            .into_iter()
            .collect(),
        );
        let reference = StaticReference::new(tables).unwrap();
        let state = state(json!({ "search_type": "spend" }));
        assert_eq!(
            submit_transact_search(&state, &reference),
            Err(StateError::Overflow(Slot::SearchType))
        );
    }

    #[test]
    fn search_needs_a_category() {
        assert_eq!(
            submit_transact_search(&ConversationState::new(), &StaticReference::default()),
            Err(StateError::Missing(Slot::SearchType))
        );
    }

    // ──────────────────────────────────────────────
    // Transfer and balance
    // ──────────────────────────────────────────────

    #[test]
    fn confirmed_transfer_records_the_amount() {
        let state = state(json!({ "PERSON": "Harry", "amount_of_money": 100, "confirm": true }));
        let outcome = submit_transfer(&state).unwrap();
        assert_eq!(outcome.notice_keys(), vec![NoticeKey::TransferComplete]);
        assert_eq!(outcome.updates.len(), 4);
        assert_eq!(
            outcome
                .update_for(Slot::AmountTransferred)
                .and_then(|u| u.value())
                .map(|v| v.to_string()),
            Some("100.00".to_string())
        );
    }

    #[test]
    fn cancelled_transfer_only_clears_its_slots() {
        let state = state(json!({ "PERSON": "Harry", "amount_of_money": 100, "confirm": false }));
        let outcome = submit_transfer(&state).unwrap();
        assert_eq!(outcome.notice_keys(), vec![NoticeKey::TransferCancelled]);
        assert_eq!(outcome.updates, clear_all(&TRANSFER_SLOTS));
    }

    #[test]
    fn confirmed_transfer_without_an_amount_is_an_error() {
        let state = state(json!({ "PERSON": "Harry", "amount_of_money": "heaps", "confirm": true }));
        assert!(matches!(
            submit_transfer(&state),
            Err(StateError::Corrupted { slot: Slot::AmountOfMoney, .. })
        ));
    }

    #[test]
    fn pending_transfer_changes_the_balance() {
        let state = state(json!({ "account_balance": "550.00", "amount_transferred": "100" }));
        let outcome = account_balance(&state, &StaticReference::default()).unwrap();
        assert_eq!(outcome.notice_keys(), vec![NoticeKey::ChangedAccountBalance]);
        let notice = &outcome.notices[0];
        assert_eq!(notice.param("init_account_balance"), Some("550.00"));
        assert_eq!(notice.param("account_balance"), Some("450.00"));
        assert_eq!(
            outcome.updates,
            vec![
                SlotUpdate::clear(Slot::PaymentAmount),
                SlotUpdate::set(Slot::AccountBalance, Decimal::new(45000, 2)),
                SlotUpdate::clear(Slot::AmountTransferred),
            ]
        );
    }

    #[test]
    fn balance_without_transfer_is_reported() {
        let outcome = account_balance(&ConversationState::new(), &StaticReference::default())
            .unwrap();
        assert_eq!(outcome.notice_keys(), vec![NoticeKey::AccountBalance]);
        assert_eq!(outcome.notices[0].param("init_account_balance"), Some("550.00"));
        assert_eq!(outcome.updates, vec![SlotUpdate::clear(Slot::PaymentAmount)]);
    }

    #[test]
    fn zero_transfer_counts_as_none() {
        let state = state(json!({ "amount_transferred": 0 }));
        let outcome = account_balance(&state, &StaticReference::default()).unwrap();
        assert_eq!(outcome.notice_keys(), vec![NoticeKey::AccountBalance]);
    }

    #[test]
    fn every_completion_maps_to_a_distinct_notice() {
        let all = [
            Completion::PaymentScheduled,
            Completion::PaymentCancelled,
            Completion::Searching(SearchType::Spend),
            Completion::Searching(SearchType::Deposit),
            Completion::Found(SearchType::Spend),
            Completion::Found(SearchType::Deposit),
            Completion::TransferComplete,
            Completion::TransferCancelled,
            Completion::BalanceChanged,
            Completion::BalanceReported,
        ];
        let keys: std::collections::BTreeSet<&str> =
            all.iter().map(|c| c.notice_key().template()).collect();
        assert_eq!(keys.len(), all.len());
    }
}
