use chrono::{Local, NaiveDateTime, Timelike};
use serde_json::json;

use crate::canonical::canonical_bytes;
use crate::crypto::sha256_hex;
use crate::error::Result;
use crate::payment::Payload;

/// `prev_hash` of block 0. A sentinel, not a digest.
pub const GENESIS_PREV_HASH: &str = "0";

/// An immutable, hash-sealed ledger entry.
///
/// Fields are private: `hash` is a function of the other four, so nothing may
/// change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    index: u64,
    timestamp: String,
    payload: Payload,
    prev_hash: String,
    hash: String,
}

impl Block {
    /// Seal a block stamped with the current local time.
    pub fn new(index: u64, payload: Payload, prev_hash: impl Into<String>) -> Result<Self> {
        Self::with_timestamp(index, payload, prev_hash, current_timestamp())
    }

    /// Seal a block with an explicit timestamp.
    pub fn with_timestamp(
        index: u64,
        payload: Payload,
        prev_hash: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<Self> {
        let prev_hash = prev_hash.into();
        let timestamp = timestamp.into();
        let hash = calculate_hash(index, &payload, &prev_hash, &timestamp)?;

        Ok(Block {
            index,
            timestamp,
            payload,
            prev_hash,
            hash,
        })
    }

    /// Block 0: `{info: "Loan Genesis"}` linked to [`GENESIS_PREV_HASH`].
    pub fn genesis() -> Self {
        Self::new(0, Payload::genesis(), GENESIS_PREV_HASH)
            .expect("genesis payload has a canonical encoding")
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn prev_hash(&self) -> &str {
        &self.prev_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Digest of the stored fields, using the stored timestamp.
    pub fn recompute_hash(&self) -> Result<String> {
        calculate_hash(self.index, &self.payload, &self.prev_hash, &self.timestamp)
    }
}

/// Fingerprint of a block tuple: SHA-256 over the canonical encoding of
/// `{"idx", "data", "prev", "time"}`.
pub fn calculate_hash(
    index: u64,
    payload: &Payload,
    prev_hash: &str,
    timestamp: &str,
) -> Result<String> {
    let record = json!({
        "idx": index,
        "data": payload.to_value(),
        "prev": prev_hash,
        "time": timestamp,
    });
    Ok(sha256_hex(&canonical_bytes(&record)?))
}

/// Local wall-clock time as `YYYY-MM-DD HH:MM:SS.ffffff`.
pub fn current_timestamp() -> String {
    format_timestamp(&Local::now().naive_local())
}

/// The fractional part is dropped when it is zero microseconds.
pub fn format_timestamp(time: &NaiveDateTime) -> String {
    if time.nanosecond() / 1_000 == 0 {
        time.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        time.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{Map, Value};

    const TS: &str = "2024-03-01 09:15:42.123456";

    fn payment_payload() -> Payload {
        Payload::new()
            .with_integer("Month", 1)
            .with_number("Payment", 1579.61)
            .unwrap()
            .with_number("Principal_Paid", 445.28)
            .unwrap()
            .with_number("Interest_Paid", 1134.33)
            .unwrap()
            .with_number("Remaining_Balance", 249554.72)
            .unwrap()
    }

    #[test]
    fn test_hash_is_digest_of_canonical_tuple() {
        let block = Block::with_timestamp(1, payment_payload(), "ab".repeat(32), TS).unwrap();

        let expected_input = format!(
            "{{\"data\": {{\"Interest_Paid\": 1134.33, \"Month\": 1, \"Payment\": 1579.61, \
             \"Principal_Paid\": 445.28, \"Remaining_Balance\": 249554.72}}, \"idx\": 1, \
             \"prev\": \"{}\", \"time\": \"{}\"}}",
            "ab".repeat(32),
            TS
        );
        assert_eq!(block.hash(), sha256_hex(expected_input.as_bytes()));
        assert_eq!(block.hash().len(), 64);
        assert_eq!(block.recompute_hash().unwrap(), block.hash());
    }

    #[test]
    fn test_hash_ignores_payload_insertion_order() {
        let mut reversed = Map::new();
        for (key, value) in payment_payload().iter().collect::<Vec<_>>().into_iter().rev() {
            reversed.insert(key.clone(), value.clone());
        }
        let a = Block::with_timestamp(3, payment_payload(), "0", TS).unwrap();
        let b = Block::with_timestamp(3, Payload::from(reversed), "0", TS).unwrap();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_any_field_changes_the_hash() {
        let base = Block::with_timestamp(1, payment_payload(), "0", TS).unwrap();

        let other_index = Block::with_timestamp(2, payment_payload(), "0", TS).unwrap();
        let other_prev = Block::with_timestamp(1, payment_payload(), "1", TS).unwrap();
        let other_time =
            Block::with_timestamp(1, payment_payload(), "0", "2024-03-01 09:15:42.123457").unwrap();
        let other_data = Block::with_timestamp(
            1,
            payment_payload().with_number("Payment", 1579.62).unwrap(),
            "0",
            TS,
        )
        .unwrap();

        for other in [&other_index, &other_prev, &other_time, &other_data] {
            assert_ne!(base.hash(), other.hash());
        }
    }

    #[test]
    fn test_genesis_block_shape() {
        let genesis = Block::genesis();
        assert!(genesis.is_genesis());
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.prev_hash(), GENESIS_PREV_HASH);
        assert_eq!(
            genesis.payload().get("info"),
            Some(&Value::String("Loan Genesis".into()))
        );
    }

    #[test]
    fn test_format_timestamp() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let with_micros = date.and_hms_micro_opt(3, 4, 5, 678).unwrap();
        let whole_second = date.and_hms_opt(3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&with_micros), "2024-01-02 03:04:05.000678");
        assert_eq!(format_timestamp(&whole_second), "2024-01-02 03:04:05");
    }
}
