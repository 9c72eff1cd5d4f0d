//! Slot names and their canonical typed values.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::amount::format_money;
use crate::error::StateError;

// ──────────────────────────────────────────────
// Slot names
// ──────────────────────────────────────────────

/// Every slot the engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    CreditCard,
    PaymentAmount,
    PaymentAmountType,
    Currency,
    Time,
    Grain,
    StartTime,
    EndTime,
    VendorName,
    SearchType,
    Confirm,
    #[serde(rename = "PERSON")]
    Person,
    AmountOfMoney,
    AmountTransferred,
    AccountBalance,
}

impl Slot {
    pub const ALL: [Slot; 15] = [
        Slot::CreditCard,
        Slot::PaymentAmount,
        Slot::PaymentAmountType,
        Slot::Currency,
        Slot::Time,
        Slot::Grain,
        Slot::StartTime,
        Slot::EndTime,
        Slot::VendorName,
        Slot::SearchType,
        Slot::Confirm,
        Slot::Person,
        Slot::AmountOfMoney,
        Slot::AmountTransferred,
        Slot::AccountBalance,
    ];

    /// Name of the slot in the dialogue manager's slot map.
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::CreditCard => "credit_card",
            Slot::PaymentAmount => "payment_amount",
            Slot::PaymentAmountType => "payment_amount_type",
            Slot::Currency => "currency",
            Slot::Time => "time",
            Slot::Grain => "grain",
            Slot::StartTime => "start_time",
            Slot::EndTime => "end_time",
            Slot::VendorName => "vendor_name",
            Slot::SearchType => "search_type",
            Slot::Confirm => "confirm",
            Slot::Person => "PERSON",
            Slot::AmountOfMoney => "amount_of_money",
            Slot::AmountTransferred => "amount_transferred",
            Slot::AccountBalance => "account_balance",
        }
    }

    /// The value shape this slot holds once the state has been read.
    pub fn kind(self) -> SlotKind {
        match self {
            Slot::PaymentAmount | Slot::AmountOfMoney => SlotKind::AmountOrText,
            Slot::AmountTransferred | Slot::AccountBalance => SlotKind::Amount,
            Slot::Confirm => SlotKind::Flag,
            Slot::Grain => SlotKind::Grain,
            Slot::SearchType => SlotKind::SearchType,
            Slot::CreditCard
            | Slot::PaymentAmountType
            | Slot::Currency
            | Slot::Time
            | Slot::StartTime
            | Slot::EndTime
            | Slot::VendorName
            | Slot::Person => SlotKind::Text,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| StateError::UnknownSlot(s.to_string()))
    }
}

/// Value shape of a slot.
///
/// `AmountOrText` slots hold whatever the user said until a validator
/// turns it into an amount; `Amount` slots only ever hold numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Text,
    Amount,
    AmountOrText,
    Flag,
    Grain,
    SearchType,
}

impl SlotKind {
    pub fn describe(self) -> &'static str {
        match self {
            SlotKind::Text => "text",
            SlotKind::Amount => "a numeric amount",
            SlotKind::AmountOrText => "an amount or text",
            SlotKind::Flag => "a boolean",
            SlotKind::Grain => "a time grain",
            SlotKind::SearchType => "a search type",
        }
    }
}

// ──────────────────────────────────────────────
// Enumerated slot values
// ──────────────────────────────────────────────

/// Granularity of a resolved time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grain {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Grain {
    pub fn as_str(self) -> &'static str {
        match self {
            Grain::Second => "second",
            Grain::Minute => "minute",
            Grain::Hour => "hour",
            Grain::Day => "day",
            Grain::Week => "week",
            Grain::Month => "month",
            Grain::Quarter => "quarter",
            Grain::Year => "year",
        }
    }
}

impl fmt::Display for Grain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "second" => Ok(Grain::Second),
            "minute" => Ok(Grain::Minute),
            "hour" => Ok(Grain::Hour),
            "day" => Ok(Grain::Day),
            "week" => Ok(Grain::Week),
            "month" => Ok(Grain::Month),
            "quarter" => Ok(Grain::Quarter),
            "year" => Ok(Grain::Year),
            _ => Err(s.to_string()),
        }
    }
}

/// Transaction category searched by the transaction-search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Spend,
    Deposit,
}

impl SearchType {
    pub const ALL: [SearchType; 2] = [SearchType::Spend, SearchType::Deposit];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Spend => "spend",
            SearchType::Deposit => "deposit",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spend" => Ok(SearchType::Spend),
            "deposit" => Ok(SearchType::Deposit),
            _ => Err(s.to_string()),
        }
    }
}

/// Read through [`FromStr`] so configuration map keys parse the same way
/// slot values do.
impl<'de> Deserialize<'de> for SearchType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|bad| D::Error::custom(format!("unknown search type '{}'", bad)))
    }
}

// ──────────────────────────────────────────────
// Slot values
// ──────────────────────────────────────────────

/// A typed slot value.
///
/// Amounts serialize as strings (`"12.50"`) to keep their scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SlotValue {
    Text(String),
    Amount(Decimal),
    Flag(bool),
    Grain(Grain),
    Search(SearchType),
}

impl SlotValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SlotValue::Text(_) => "text",
            SlotValue::Amount(_) => "amount",
            SlotValue::Flag(_) => "boolean",
            SlotValue::Grain(_) => "grain",
            SlotValue::Search(_) => "search type",
        }
    }

    /// Whether this value is a legal content for a slot of `kind`.
    pub fn fits(&self, kind: SlotKind) -> bool {
        matches!(
            (kind, self),
            (SlotKind::Text, SlotValue::Text(_))
                | (SlotKind::Amount, SlotValue::Amount(_))
                | (SlotKind::AmountOrText, SlotValue::Amount(_) | SlotValue::Text(_))
                | (SlotKind::Flag, SlotValue::Flag(_))
                | (SlotKind::Grain, SlotValue::Grain(_))
                | (SlotKind::SearchType, SlotValue::Search(_))
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SlotValue::Text(s) => serde_json::Value::String(s.clone()),
            SlotValue::Amount(d) => serde_json::Value::String(d.to_string()),
            SlotValue::Flag(b) => serde_json::Value::Bool(*b),
            SlotValue::Grain(g) => serde_json::Value::String(g.as_str().to_string()),
            SlotValue::Search(t) => serde_json::Value::String(t.as_str().to_string()),
        }
    }
}

/// Notice-parameter rendering: amounts at two places, everything else bare.
impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Text(s) => f.write_str(s),
            SlotValue::Amount(d) => f.write_str(&format_money(*d)),
            SlotValue::Flag(b) => write!(f, "{}", b),
            SlotValue::Grain(g) => f.write_str(g.as_str()),
            SlotValue::Search(t) => f.write_str(t.as_str()),
        }
    }
}

impl From<&str> for SlotValue {
    fn from(s: &str) -> Self {
        SlotValue::Text(s.to_string())
    }
}

impl From<String> for SlotValue {
    fn from(s: String) -> Self {
        SlotValue::Text(s)
    }
}

impl From<Decimal> for SlotValue {
    fn from(d: Decimal) -> Self {
        SlotValue::Amount(d)
    }
}

impl From<bool> for SlotValue {
    fn from(b: bool) -> Self {
        SlotValue::Flag(b)
    }
}

impl From<Grain> for SlotValue {
    fn from(g: Grain) -> Self {
        SlotValue::Grain(g)
    }
}

impl From<SearchType> for SlotValue {
    fn from(t: SearchType) -> Self {
        SlotValue::Search(t)
    }
}
