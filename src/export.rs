//! Exportable views of a ledger: the JSON record list and the CSV display
//! table. Nothing here touches the filesystem.

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::blockchain::Block;
use crate::canonical::python_float_repr;
use crate::crypto::hash_preview;
use crate::error::Result;
use crate::payment::Payload;

/// Default number of hex characters shown in the CSV `Block_Hash` column.
pub const DEFAULT_HASH_PREVIEW_LEN: usize = 12;

/// One sealed block as written to the JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub index: u64,
    pub hash: String,
    pub prev_hash: String,
    pub timestamp: String,
    pub data: Payload,
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        BlockRecord {
            index: block.index(),
            hash: block.hash().to_string(),
            prev_hash: block.prev_hash().to_string(),
            timestamp: block.timestamp().to_string(),
            data: block.payload().clone(),
        }
    }
}

/// JSON array of records, indented with four spaces.
pub fn to_json(records: &[BlockRecord]) -> Result<String> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    records.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Parse a JSON export back into records.
pub fn from_json(json: &str) -> Result<Vec<BlockRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Flatten the payment blocks into a CSV table: a `Block_Hash` preview column
/// followed by the payload fields in first-seen order. Genesis is skipped.
pub fn to_csv(records: &[BlockRecord], preview_len: usize) -> String {
    let payments = || records.iter().filter(|r| r.index != 0);

    let mut columns: Vec<&str> = Vec::new();
    for record in payments() {
        for key in record.data.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = std::iter::once("Block_Hash")
        .chain(columns.iter().copied())
        .map(escape_csv)
        .collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for record in payments() {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(escape_csv(&hash_preview(&record.hash, preview_len)));
        for column in &columns {
            let cell = record.data.get(column).map(csv_cell).unwrap_or_default();
            row.push(escape_csv(&cell));
        }
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n.as_f64().map(python_float_repr).unwrap_or_default(),
        other => other.to_string(),
    }
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
