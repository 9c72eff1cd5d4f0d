//! Text rendering of engine outcomes.

use tally_core::{Notice, Outcome, SlotUpdate};

/// One line per notice, e.g. `utter_account_balance (init_account_balance=550.00)`.
pub(crate) fn notice_line(notice: &Notice) -> String {
    if notice.params.is_empty() {
        return notice.key.to_string();
    }
    let params: Vec<String> = notice
        .params
        .iter()
        .map(|(name, value)| format!("{}={:?}", name, value))
        .collect();
    format!("{} ({})", notice.key, params.join(", "))
}

pub(crate) fn update_line(update: &SlotUpdate) -> String {
    match update {
        SlotUpdate::Set(slot, value) => format!("set {} = {}", slot, value),
        SlotUpdate::Clear(slot) => format!("clear {}", slot),
    }
}

/// The indented body printed for an outcome.
pub(crate) fn outcome_lines(outcome: &Outcome) -> Vec<String> {
    if outcome.is_empty() {
        return vec!["(no notices, no updates)".to_string()];
    }
    outcome
        .notices
        .iter()
        .map(|n| format!("notice: {}", notice_line(n)))
        .chain(outcome.updates.iter().map(update_line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{NoticeKey, Slot};

    #[test]
    fn notices_list_their_params() {
        let notice = Notice::new(NoticeKey::ChangedAccountBalance)
            .with("init_account_balance", "550.00")
            .with("account_balance", "450.00");
        assert_eq!(
            notice_line(&notice),
            r#"utter_changed_account_balance (account_balance="450.00", init_account_balance="550.00")"#
        );
        assert_eq!(notice_line(&Notice::new(NoticeKey::NoCreditCard)), "utter_no_creditcard");
    }

    #[test]
    fn outcome_lines_put_notices_first() {
        let outcome = Outcome::new(
            vec![Notice::new(NoticeKey::TransferCancelled)],
            vec![
                SlotUpdate::clear(Slot::Person),
                SlotUpdate::set(Slot::Currency, "$"),
            ],
        );
        assert_eq!(
            outcome_lines(&outcome),
            vec![
                "notice: utter_transfer_cancelled",
                "clear PERSON",
                "set currency = $",
            ]
        );
        assert_eq!(outcome_lines(&Outcome::default()), vec!["(no notices, no updates)"]);
    }
}
