//! Notices: parameterized message requests for the presentation layer.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::state::SlotUpdate;

/// Every message the engine can ask to have rendered. Serialized as the
/// template name the presentation layer knows it by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NoticeKey {
    #[serde(rename = "utter_no_payment_amount")]
    NoPaymentAmount,
    #[serde(rename = "utter_no_creditcard")]
    NoCreditCard,
    #[serde(rename = "utter_no_vendor_name")]
    NoVendorName,
    #[serde(rename = "utter_no_transactdate")]
    NoTransactionDate,
    #[serde(rename = "utter_cc_pay_scheduled")]
    CcPayScheduled,
    #[serde(rename = "utter_cc_pay_cancelled")]
    CcPayCancelled,
    #[serde(rename = "utter_searching_spend_transactions")]
    SearchingSpendTransactions,
    #[serde(rename = "utter_found_spend_transactions")]
    FoundSpendTransactions,
    #[serde(rename = "utter_searching_deposit_transactions")]
    SearchingDepositTransactions,
    #[serde(rename = "utter_found_deposit_transactions")]
    FoundDepositTransactions,
    #[serde(rename = "utter_transfer_complete")]
    TransferComplete,
    #[serde(rename = "utter_transfer_cancelled")]
    TransferCancelled,
    #[serde(rename = "utter_changed_account_balance")]
    ChangedAccountBalance,
    #[serde(rename = "utter_account_balance")]
    AccountBalance,
}

impl NoticeKey {
    pub const ALL: [NoticeKey; 14] = [
        NoticeKey::NoPaymentAmount,
        NoticeKey::NoCreditCard,
        NoticeKey::NoVendorName,
        NoticeKey::NoTransactionDate,
        NoticeKey::CcPayScheduled,
        NoticeKey::CcPayCancelled,
        NoticeKey::SearchingSpendTransactions,
        NoticeKey::FoundSpendTransactions,
        NoticeKey::SearchingDepositTransactions,
        NoticeKey::FoundDepositTransactions,
        NoticeKey::TransferComplete,
        NoticeKey::TransferCancelled,
        NoticeKey::ChangedAccountBalance,
        NoticeKey::AccountBalance,
    ];

    pub fn template(self) -> &'static str {
        match self {
            NoticeKey::NoPaymentAmount => "utter_no_payment_amount",
            NoticeKey::NoCreditCard => "utter_no_creditcard",
            NoticeKey::NoVendorName => "utter_no_vendor_name",
            NoticeKey::NoTransactionDate => "utter_no_transactdate",
            NoticeKey::CcPayScheduled => "utter_cc_pay_scheduled",
            NoticeKey::CcPayCancelled => "utter_cc_pay_cancelled",
            NoticeKey::SearchingSpendTransactions => "utter_searching_spend_transactions",
            NoticeKey::FoundSpendTransactions => "utter_found_spend_transactions",
            NoticeKey::SearchingDepositTransactions => "utter_searching_deposit_transactions",
            NoticeKey::FoundDepositTransactions => "utter_found_deposit_transactions",
            NoticeKey::TransferComplete => "utter_transfer_complete",
            NoticeKey::TransferCancelled => "utter_transfer_cancelled",
            NoticeKey::ChangedAccountBalance => "utter_changed_account_balance",
            NoticeKey::AccountBalance => "utter_account_balance",
        }
    }
}

impl fmt::Display for NoticeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template())
    }
}

/// A notice with its named parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    #[serde(rename = "template")]
    pub key: NoticeKey,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl Notice {
    pub fn new(key: NoticeKey) -> Self {
        Notice {
            key,
            params: BTreeMap::new(),
        }
    }

    /// Bind a parameter, replacing any earlier binding of the same name.
    pub fn with(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// What one engine call hands back: notices to render, in order, and the
/// slot updates to apply as one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub notices: Vec<Notice>,
    pub updates: Vec<SlotUpdate>,
}

impl Outcome {
    pub fn new(notices: Vec<Notice>, updates: Vec<SlotUpdate>) -> Self {
        Outcome { notices, updates }
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty() && self.updates.is_empty()
    }

    pub fn notice_keys(&self) -> Vec<NoticeKey> {
        self.notices.iter().map(|n| n.key).collect()
    }

    /// The last update touching `slot`, which is the one that wins.
    pub fn update_for(&self, slot: crate::slot::Slot) -> Option<&SlotUpdate> {
        self.updates.iter().rev().find(|u| u.slot() == slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_templates() {
        for key in NoticeKey::ALL {
            assert_eq!(
                serde_json::to_value(key).unwrap(),
                serde_json::Value::String(key.template().to_string())
            );
        }
    }

    #[test]
    fn notice_serializes_with_params() {
        let notice = Notice::new(NoticeKey::AccountBalance).with("init_account_balance", "550.00");
        assert_eq!(
            serde_json::to_value(&notice).unwrap(),
            serde_json::json!({
                "template": "utter_account_balance",
                "params": { "init_account_balance": "550.00" }
            })
        );
        let bare = Notice::new(NoticeKey::NoCreditCard);
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            serde_json::json!({ "template": "utter_no_creditcard" })
        );
    }
}
