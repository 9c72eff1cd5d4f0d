//! Reference data: the whitelists and transaction history validators and
//! submission handlers consult.
//!
//! A `ReferenceData` provider is built once, never mutated, and shared by
//! every conversation. Keys are stored lowercase; callers lowercase user
//! input before looking it up.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::SearchType;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors building a reference provider from tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// Two keys of one table differ only by letter case.
    #[error("duplicate {table} entry '{key}' (keys are case-insensitive)")]
    DuplicateKey { table: &'static str, key: String },

    /// A table key is empty after trimming.
    #[error("empty key in {table}")]
    EmptyKey { table: &'static str },
}

// ──────────────────────────────────────────────
// Trait
// ──────────────────────────────────────────────

/// Read-only lookup tables. `Send + Sync` so one instance can serve many
/// conversations without locking.
pub trait ReferenceData: Send + Sync {
    /// Amount a named payment alias stands for (`"minimum balance"`).
    fn payment_amount(&self, alias: &str) -> Option<Decimal>;

    fn is_known_card(&self, name: &str) -> bool;

    fn is_known_vendor(&self, name: &str) -> bool;

    /// Transactions of `category`, restricted to `vendor` when given.
    /// Unknown categories and vendors yield an empty list.
    fn transactions(&self, category: SearchType, vendor: Option<&str>) -> Vec<&Transaction>;

    /// Balance a conversation starts with.
    fn opening_balance(&self) -> Decimal;
}

// ──────────────────────────────────────────────
// Tables
// ──────────────────────────────────────────────

/// One recorded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: Decimal,
}

impl Transaction {
    pub fn new(amount: Decimal) -> Self {
        Transaction { amount }
    }
}

/// The raw tables, as loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTables {
    /// Payment alias → amount.
    #[serde(default)]
    pub payment_amounts: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub credit_cards: BTreeSet<String>,
    #[serde(default)]
    pub vendors: BTreeSet<String>,
    /// Category → counterparty → transactions, oldest first.
    #[serde(default)]
    pub transactions: BTreeMap<SearchType, BTreeMap<String, Vec<Transaction>>>,
    #[serde(default = "default_opening_balance")]
    pub opening_balance: Decimal,
}

fn default_opening_balance() -> Decimal {
    Decimal::new(55000, 2)
}

fn ledger(counterparty: &str, cents: &[i64]) -> (String, Vec<Transaction>) {
    let txs = cents
        .iter()
        .map(|c| Transaction::new(Decimal::new(*c, 2)))
        .collect();
    (counterparty.to_string(), txs)
}

impl Default for ReferenceTables {
    /// The assistant's built-in tables.
    fn default() -> Self {
        let payment_amounts = BTreeMap::from([
            ("minimum balance".to_string(), Decimal::from(85)),
            ("current balance".to_string(), Decimal::from(550)),
        ]);
        let credit_cards = ["iron bank", "credit all", "gringots", "justice bank"]
            .into_iter()
            .map(String::from)
            .collect();
        let vendors = ["amazon", "target", "starbucks"]
            .into_iter()
            .map(String::from)
            .collect();

        let transactions = BTreeMap::from([
            (
                SearchType::Spend,
                BTreeMap::from([
                    ledger("amazon", &[3595, 935, 4950]),
                    ledger("target", &[13010]),
                ]),
            ),
            (
                SearchType::Deposit,
                BTreeMap::from([ledger("employer", &[125000]), ledger("interest", &[5050])]),
            ),
        ]);

        ReferenceTables {
            payment_amounts,
            credit_cards,
            vendors,
            transactions,
            opening_balance: default_opening_balance(),
        }
    }
}

// ──────────────────────────────────────────────
// StaticReference
// ──────────────────────────────────────────────

/// A provider over fixed, in-memory tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticReference {
    tables: ReferenceTables,
}

impl StaticReference {
    /// Build a provider, lowercasing every key.
    pub fn new(tables: ReferenceTables) -> Result<Self, ReferenceError> {
        let payment_amounts = lower_keys("payment_amounts", tables.payment_amounts)?;
        let credit_cards = lower_set("credit_cards", tables.credit_cards)?;
        let vendors = lower_set("vendors", tables.vendors)?;
        let transactions = tables
            .transactions
            .into_iter()
            .map(|(category, by_vendor)| Ok((category, lower_keys("transactions", by_vendor)?)))
            .collect::<Result<_, ReferenceError>>()?;

        Ok(StaticReference {
            tables: ReferenceTables {
                payment_amounts,
                credit_cards,
                vendors,
                transactions,
                opening_balance: tables.opening_balance,
            },
        })
    }

    /// The normalized tables.
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }
}

impl Default for StaticReference {
    fn default() -> Self {
        // Built-in keys are already lowercase and unique.
        StaticReference {
            tables: ReferenceTables::default(),
        }
    }
}

impl ReferenceData for StaticReference {
    fn payment_amount(&self, alias: &str) -> Option<Decimal> {
        self.tables.payment_amounts.get(alias).copied()
    }

    fn is_known_card(&self, name: &str) -> bool {
        self.tables.credit_cards.contains(name)
    }

    fn is_known_vendor(&self, name: &str) -> bool {
        self.tables.vendors.contains(name)
    }

    fn transactions(&self, category: SearchType, vendor: Option<&str>) -> Vec<&Transaction> {
        let Some(by_vendor) = self.tables.transactions.get(&category) else {
            return Vec::new();
        };
        match vendor {
            Some(vendor) => by_vendor
                .get(vendor)
                .map(|txs| txs.iter().collect())
                .unwrap_or_default(),
            None => by_vendor.values().flatten().collect(),
        }
    }

    fn opening_balance(&self) -> Decimal {
        self.tables.opening_balance
    }
}

fn normalize_key(table: &'static str, key: &str) -> Result<String, ReferenceError> {
    let key = key.trim().to_lowercase();
    if key.is_empty() {
        return Err(ReferenceError::EmptyKey { table });
    }
    Ok(key)
}

fn lower_keys<V>(
    table: &'static str,
    map: BTreeMap<String, V>,
) -> Result<BTreeMap<String, V>, ReferenceError> {
    let mut out = BTreeMap::new();
    for (key, value) in map {
        let key = normalize_key(table, &key)?;
        if out.contains_key(&key) {
            return Err(ReferenceError::DuplicateKey { table, key });
        }
        out.insert(key, value);
    }
    Ok(out)
}

fn lower_set(
    table: &'static str,
    set: BTreeSet<String>,
) -> Result<BTreeSet<String>, ReferenceError> {
    let mut out = BTreeSet::new();
    for key in set {
        let key = normalize_key(table, &key)?;
        if !out.insert(key.clone()) {
            return Err(ReferenceError::DuplicateKey { table, key });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(txs: &[&Transaction]) -> Decimal {
        txs.iter().map(|t| t.amount).sum()
    }

    #[test]
    fn builtin_tables_hold_the_assistant_data() {
        let reference = StaticReference::default();
        assert_eq!(reference.payment_amount("current balance"), Some(Decimal::from(550)));
        assert_eq!(reference.payment_amount("minimum balance"), Some(Decimal::from(85)));
        assert!(reference.is_known_card("gringots"));
        assert!(reference.is_known_vendor("starbucks"));
        assert_eq!(reference.opening_balance().to_string(), "550.00");
    }

    #[test]
    fn vendor_filter_selects_one_history() {
        let reference = StaticReference::default();
        let amazon = reference.transactions(SearchType::Spend, Some("amazon"));
        assert_eq!(amazon.len(), 3);
        assert_eq!(sum(&amazon), Decimal::new(9480, 2));
    }

    #[test]
    fn no_filter_flattens_the_category() {
        let reference = StaticReference::default();
        let spend = reference.transactions(SearchType::Spend, None);
        assert_eq!(spend.len(), 4);
        assert_eq!(sum(&spend), Decimal::new(22490, 2));
        let deposits = reference.transactions(SearchType::Deposit, None);
        assert_eq!(sum(&deposits), Decimal::new(130050, 2));
    }

    #[test]
    fn unknown_vendor_yields_no_transactions() {
        let reference = StaticReference::default();
        assert!(reference
            .transactions(SearchType::Spend, Some("starbucks"))
            .is_empty());
        assert!(reference
            .transactions(SearchType::Deposit, Some("amazon"))
            .is_empty());
    }

    #[test]
    fn construction_lowercases_keys() {
        let tables = ReferenceTables {
            payment_amounts: BTreeMap::from([("Statement Balance".to_string(), Decimal::from(42))]),
            credit_cards: BTreeSet::from(["  Iron Bank ".to_string()]),
            vendors: BTreeSet::from(["Amazon".to_string()]),
            transactions: BTreeMap::from([(
                SearchType::Spend,
                BTreeMap::from([("Amazon".to_string(), vec![Transaction::new(Decimal::ONE)])]),
            )]),
            opening_balance: Decimal::from(10),
        };
        let reference = StaticReference::new(tables).unwrap();
        assert_eq!(reference.payment_amount("statement balance"), Some(Decimal::from(42)));
        assert!(reference.is_known_card("iron bank"));
        assert!(reference.is_known_vendor("amazon"));
        assert_eq!(reference.transactions(SearchType::Spend, Some("amazon")).len(), 1);
    }

    #[test]
    fn case_only_duplicates_are_rejected() {
        let tables = ReferenceTables {
            vendors: BTreeSet::from(["Target".to_string(), "target".to_string()]),
            ..ReferenceTables::default()
        };
        assert_eq!(
            StaticReference::new(tables),
            Err(ReferenceError::DuplicateKey {
                table: "vendors",
                key: "target".to_string()
            })
        );
    }

    #[test]
    fn default_tables_survive_normalization() {
        let rebuilt = StaticReference::new(ReferenceTables::default()).unwrap();
        assert_eq!(rebuilt, StaticReference::default());
    }
}
