use tracing::debug;

use crate::blockchain::core::block::Block;
use crate::blockchain::core::validation::{verify_chain, BlockView};
use crate::error::Result;
use crate::export::BlockRecord;
use crate::payment::{Payload, PaymentRecord};

/// Append-only sequence of blocks, seeded with the genesis block.
///
/// `blocks[i].prev_hash() == blocks[i - 1].hash()` and `blocks[i].index() == i`
/// hold for every `i > 0`. The only mutation is [`Ledger::append_payment`].
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create a ledger holding only the genesis block.
    pub fn new() -> Self {
        let genesis = Block::genesis();
        debug!(hash = %genesis.hash(), "ledger.genesis");
        Ledger {
            blocks: vec![genesis],
        }
    }

    /// Seal `payload` into a new block linked to the current tip.
    ///
    /// On error nothing is appended.
    pub fn append_payment(&mut self, payload: Payload) -> Result<&Block> {
        let tip = self.tip();
        let block = Block::new(self.blocks.len() as u64, payload, tip.hash())?;

        debug!(index = block.index(), hash = %block.hash(), "ledger.append");
        self.blocks.push(block);
        Ok(self.tip())
    }

    /// Convenience wrapper sealing one schedule row.
    pub fn append_record(&mut self, record: &PaymentRecord) -> Result<&Block> {
        let payload = record.to_payload()?;
        self.append_payment(payload)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn tip(&self) -> &Block {
        // Genesis is always present.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Export view: one record per block, ascending index.
    pub fn records(&self) -> Vec<BlockRecord> {
        self.blocks.iter().map(BlockRecord::from).collect()
    }

    /// Recompute every digest from the stored fields and check the links.
    pub fn verify(&self) -> Result<usize> {
        verify_chain(self.blocks.iter().map(BlockView::from))
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::core::block::GENESIS_PREV_HASH;

    fn record(month: u32) -> PaymentRecord {
        PaymentRecord {
            month,
            payment: 1579.61,
            principal_paid: 445.28,
            interest_paid: 1134.33,
            remaining_balance: 249554.72,
        }
    }

    #[test]
    fn test_new_ledger_holds_only_genesis() {
        let ledger = Ledger::new();
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_empty());
        assert_eq!(ledger.genesis().index(), 0);
        assert_eq!(ledger.genesis().prev_hash(), GENESIS_PREV_HASH);
        assert_eq!(ledger.tip(), ledger.genesis());
        assert_eq!(Ledger::default().len(), 1);
    }

    #[test]
    fn test_append_links_to_previous_tip() {
        let mut ledger = Ledger::new();
        let genesis_hash = ledger.genesis().hash().to_string();

        let appended = ledger.append_record(&record(1)).unwrap().clone();
        assert_eq!(appended.index(), 1);
        assert_eq!(appended.prev_hash(), genesis_hash);
        assert_eq!(ledger.tip(), &appended);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_prior_blocks_are_unchanged_by_appends() {
        let mut ledger = Ledger::new();
        ledger.append_record(&record(1)).unwrap();
        let before: Vec<Block> = ledger.blocks().to_vec();

        for month in 2..=12 {
            let len = ledger.len();
            ledger.append_record(&record(month)).unwrap();
            assert_eq!(ledger.len(), len + 1);
        }

        assert_eq!(&ledger.blocks()[..before.len()], before.as_slice());
        for (i, block) in ledger.iter().enumerate().skip(1) {
            assert_eq!(block.index(), i as u64);
            assert_eq!(block.prev_hash(), ledger.blocks()[i - 1].hash());
        }
        assert_eq!(ledger.verify().unwrap(), 13);
    }

    #[test]
    fn test_failed_append_leaves_chain_untouched() {
        let mut ledger = Ledger::new();
        let mut bad = record(1);
        bad.payment = f64::INFINITY;

        assert!(ledger.append_record(&bad).is_err());
        assert_eq!(ledger.len(), 1);
    }
}
