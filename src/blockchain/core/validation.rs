use tracing::warn;

use crate::blockchain::core::block::{calculate_hash, Block, GENESIS_PREV_HASH};
use crate::error::{LedgerError, Result};
use crate::export::BlockRecord;
use crate::payment::Payload;

/// Borrowed view over the stored fields of a block, whether it lives in a
/// [`Ledger`](crate::blockchain::Ledger) or in an exported record list.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    pub index: u64,
    pub payload: &'a Payload,
    pub prev_hash: &'a str,
    pub timestamp: &'a str,
    pub hash: &'a str,
}

impl<'a> From<&'a Block> for BlockView<'a> {
    fn from(block: &'a Block) -> Self {
        BlockView {
            index: block.index(),
            payload: block.payload(),
            prev_hash: block.prev_hash(),
            timestamp: block.timestamp(),
            hash: block.hash(),
        }
    }
}

impl<'a> From<&'a BlockRecord> for BlockView<'a> {
    fn from(record: &'a BlockRecord) -> Self {
        BlockView {
            index: record.index,
            payload: &record.data,
            prev_hash: &record.prev_hash,
            timestamp: &record.timestamp,
            hash: &record.hash,
        }
    }
}

/// Verify a chain given in ascending order.
///
/// Each digest is recomputed from the stored timestamp, never the current
/// time. Returns the number of blocks checked.
pub fn verify_chain<'a, I>(blocks: I) -> Result<usize>
where
    I: IntoIterator<Item = BlockView<'a>>,
{
    let result = check_chain(blocks);
    if let Err(e) = &result {
        warn!(error = %e, "ledger.verify.failed");
    }
    result
}

/// Verify an exported record list.
pub fn verify_records(records: &[BlockRecord]) -> Result<usize> {
    verify_chain(records.iter().map(BlockView::from))
}

fn check_chain<'a, I>(blocks: I) -> Result<usize>
where
    I: IntoIterator<Item = BlockView<'a>>,
{
    let mut previous: Option<BlockView<'a>> = None;
    let mut count = 0usize;

    for (position, block) in blocks.into_iter().enumerate() {
        if block.index != position as u64 {
            return Err(LedgerError::IndexMismatch {
                position,
                found: block.index,
            });
        }

        match &previous {
            None => check_genesis(&block)?,
            Some(prev) if block.prev_hash != prev.hash => {
                return Err(LedgerError::BrokenLink {
                    index: block.index,
                    expected: prev.hash.to_string(),
                    found: block.prev_hash.to_string(),
                });
            }
            Some(_) => {}
        }

        let recomputed =
            calculate_hash(block.index, block.payload, block.prev_hash, block.timestamp)?;
        if recomputed != block.hash {
            return Err(LedgerError::HashMismatch {
                index: block.index,
                stored: block.hash.to_string(),
                recomputed,
            });
        }

        previous = Some(block);
        count += 1;
    }

    if count == 0 {
        return Err(LedgerError::InvalidGenesis("chain is empty".to_string()));
    }
    Ok(count)
}

fn check_genesis(block: &BlockView<'_>) -> Result<()> {
    if block.prev_hash != GENESIS_PREV_HASH {
        return Err(LedgerError::InvalidGenesis(format!(
            "previous hash must be \"{}\", got \"{}\"",
            GENESIS_PREV_HASH, block.prev_hash
        )));
    }
    if *block.payload != Payload::genesis() {
        return Err(LedgerError::InvalidGenesis(
            "unexpected genesis payload".to_string(),
        ));
    }
    Ok(())
}
