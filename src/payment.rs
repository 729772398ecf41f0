//! Block payloads and the monthly payment record sealed into the ledger

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{LedgerError, Result};

/// Key/value payload carried by a block.
///
/// Insertion order is kept for display and export; fingerprints are computed
/// over the sorted form, so order never affects a hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Payload(Map::new())
    }

    /// The fixed payload of block 0.
    pub fn genesis() -> Self {
        Payload::new().with_text("info", "Loan Genesis")
    }

    pub fn with_integer(mut self, key: impl Into<String>, value: i64) -> Self {
        self.0.insert(key.into(), Value::from(value));
        self
    }

    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Adds a float field. NaN and infinities have no JSON representation and
    /// are rejected instead of being silently encoded as `null`.
    pub fn with_number(mut self, key: impl Into<String>, value: f64) -> Result<Self> {
        let key = key.into();
        let number = Number::from_f64(value)
            .ok_or_else(|| LedgerError::NonFiniteValue { field: key.clone() })?;
        self.0.insert(key, Value::Number(number));
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Payload(map)
    }
}

impl TryFrom<Value> for Payload {
    type Error = LedgerError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Payload(map)),
            other => Err(LedgerError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One month of an amortization schedule, as sealed into a block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Payment")]
    pub payment: f64,
    #[serde(rename = "Principal_Paid")]
    pub principal_paid: f64,
    #[serde(rename = "Interest_Paid")]
    pub interest_paid: f64,
    #[serde(rename = "Remaining_Balance")]
    pub remaining_balance: f64,
}

impl PaymentRecord {
    pub const FIELDS: [&'static str; 5] = [
        "Month",
        "Payment",
        "Principal_Paid",
        "Interest_Paid",
        "Remaining_Balance",
    ];

    pub fn to_payload(&self) -> Result<Payload> {
        Payload::new()
            .with_integer("Month", i64::from(self.month))
            .with_number("Payment", self.payment)?
            .with_number("Principal_Paid", self.principal_paid)?
            .with_number("Interest_Paid", self.interest_paid)?
            .with_number("Remaining_Balance", self.remaining_balance)
    }
}

impl TryFrom<&PaymentRecord> for Payload {
    type Error = LedgerError;

    fn try_from(record: &PaymentRecord) -> Result<Self> {
        record.to_payload()
    }
}
