//! Shared helpers for the command-line binaries

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::canonical::python_float_repr;
use crate::crypto::hash_preview;
use crate::export::BlockRecord;

/// Install the fmt subscriber; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `1234567.891` -> `"$1,234,567.89"`
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Table of the first `limit` sealed payments (genesis excluded).
pub fn ledger_table(records: &[BlockRecord], limit: usize, preview_len: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let columns: Vec<String> = records
        .iter()
        .find(|r| r.index != 0)
        .map(|r| r.data.keys().cloned().collect())
        .unwrap_or_default();

    let mut header = vec![Cell::new("Block_Hash")
        .add_attribute(Attribute::Bold)
        .fg(TableColor::Cyan)];
    header.extend(
        columns
            .iter()
            .map(|c| Cell::new(c).add_attribute(Attribute::Bold).fg(TableColor::Cyan)),
    );
    table.set_header(header);

    for record in records.iter().filter(|r| r.index != 0).take(limit) {
        let preview = hash_preview(&record.hash, preview_len);
        let mut row = vec![Cell::new(preview).fg(TableColor::Magenta)];
        row.extend(columns.iter().map(|c| {
            let text = match record.data.get(c) {
                Some(Value::Number(n)) if n.is_f64() => {
                    n.as_f64().map(python_float_repr).unwrap_or_default()
                }
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            Cell::new(text)
        }));
        table.add_row(row);
    }
    table
}
