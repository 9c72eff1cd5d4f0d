use rust_decimal::Decimal;
use tally_core::amount::{amount_from_json, money_scale};
use tally_core::{EntityCandidate, EntityKind};

use super::NormalizationError;

/// Currency assumed when the recognizer reports none.
pub const DEFAULT_CURRENCY: &str = "$";

/// A normalized amount. `amount` always carries two decimal places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

/// Normalize an `amount-of-money` or `number` entity.
///
/// `amount-of-money` reads the resolved `additional_info.value` and
/// `additional_info.unit`, falling back to the top-level value; `number`
/// reads the top-level value and assumes [`DEFAULT_CURRENCY`].
pub fn normalize_currency(entity: Option<&EntityCandidate>) -> Result<Money, NormalizationError> {
    let entity = entity.ok_or(NormalizationError::Missing)?;
    match entity.kind() {
        Some(EntityKind::AmountOfMoney) => {
            let raw = entity.info("value").unwrap_or(&entity.value);
            let amount = numeric(raw)?;
            let currency = entity
                .info("unit")
                .and_then(|u| u.as_str())
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .unwrap_or(DEFAULT_CURRENCY);
            Ok(Money {
                amount,
                currency: currency.to_string(),
            })
        }
        Some(EntityKind::Number) => Ok(Money {
            amount: numeric(&entity.value)?,
            currency: DEFAULT_CURRENCY.to_string(),
        }),
        _ => Err(NormalizationError::UnsupportedKind(entity.tag.clone())),
    }
}

/// Amounts are carried in cents: sub-cent digits round away, so `0.004`
/// normalizes to `0.00` like an explicit zero does.
fn numeric(raw: &serde_json::Value) -> Result<Decimal, NormalizationError> {
    if raw.is_null() {
        return Err(NormalizationError::MissingField("value"));
    }
    let exact =
        amount_from_json(raw).ok_or_else(|| NormalizationError::NotNumeric(raw.to_string()))?;
    let amount = money_scale(exact);
    if amount != exact {
        tracing::debug!(raw = %exact, amount = %amount, "amount rounded to cents");
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn money(kind: EntityKind, value: serde_json::Value) -> EntityCandidate {
        EntityCandidate::new(kind, value)
    }

    #[test]
    fn amount_of_money_uses_resolved_value_and_unit() {
        let entity = money(EntityKind::AmountOfMoney, json!(12.5))
            .with_info(json!({ "value": 12.5, "unit": "€" }));
        let m = normalize_currency(Some(&entity)).unwrap();
        assert_eq!(m.amount.to_string(), "12.50");
        assert_eq!(m.currency, "€");
    }

    #[test]
    fn missing_unit_defaults_to_dollars() {
        let entity =
            money(EntityKind::AmountOfMoney, json!(40)).with_info(json!({ "value": 40 }));
        let m = normalize_currency(Some(&entity)).unwrap();
        assert_eq!(m.amount.to_string(), "40.00");
        assert_eq!(m.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn amount_of_money_without_info_reads_top_level_value() {
        let entity = money(EntityKind::AmountOfMoney, json!("19.99"));
        assert_eq!(
            normalize_currency(Some(&entity)).unwrap().amount.to_string(),
            "19.99"
        );
    }

    #[test]
    fn number_entities_default_currency() {
        let m = normalize_currency(Some(&money(EntityKind::Number, json!(100)))).unwrap();
        assert_eq!(m.amount.to_string(), "100.00");
        assert_eq!(m.currency, "$");
    }

    #[test]
    fn sub_cent_amounts_round_to_cents() {
        let tiny = money(EntityKind::Number, json!(0.004));
        assert_eq!(normalize_currency(Some(&tiny)).unwrap().amount.to_string(), "0.00");
        let half = money(EntityKind::Number, json!("2.005"));
        assert_eq!(normalize_currency(Some(&half)).unwrap().amount.to_string(), "2.00");
        let underflow = money(EntityKind::AmountOfMoney, json!("1e-40"));
        assert_eq!(normalize_currency(Some(&underflow)).unwrap().amount.to_string(), "0.00");
    }

    #[test]
    fn absent_entity_is_missing() {
        assert_eq!(normalize_currency(None), Err(NormalizationError::Missing));
    }

    #[test]
    fn entity_without_numeric_value_fails() {
        let no_value = money(EntityKind::Number, json!(null));
        assert_eq!(
            normalize_currency(Some(&no_value)),
            Err(NormalizationError::MissingField("value"))
        );
        let words = money(EntityKind::Number, json!("a few"));
        assert!(matches!(
            normalize_currency(Some(&words)),
            Err(NormalizationError::NotNumeric(_))
        ));
    }

    #[test]
    fn other_kinds_are_unsupported() {
        let time = money(EntityKind::Time, json!("2020-06-05T00:00:00.000-07:00"));
        assert_eq!(
            normalize_currency(Some(&time)),
            Err(NormalizationError::UnsupportedKind("time".to_string()))
        );
    }
}
