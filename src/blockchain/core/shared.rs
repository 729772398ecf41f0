use parking_lot::RwLock;
use std::sync::Arc;

use crate::blockchain::core::block::Block;
use crate::blockchain::core::chain::Ledger;
use crate::error::Result;
use crate::export::BlockRecord;
use crate::payment::Payload;

/// Cloneable handle for appending to one ledger from several threads.
///
/// Appends hold the write lock across read-tip, seal and push, so two writers
/// can never link to the same tip. Readers get owned snapshots and never see a
/// half-applied append.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl Default for SharedLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::from_ledger(Ledger::new())
    }

    pub fn from_ledger(ledger: Ledger) -> Self {
        SharedLedger {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Append and return a copy of the sealed block.
    pub fn append_payment(&self, payload: Payload) -> Result<Block> {
        let mut ledger = self.inner.write();
        ledger.append_payment(payload).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn tip(&self) -> Block {
        self.inner.read().tip().clone()
    }

    pub fn snapshot(&self) -> Ledger {
        self.inner.read().clone()
    }

    pub fn records(&self) -> Vec<BlockRecord> {
        self.inner.read().records()
    }

    pub fn verify(&self) -> Result<usize> {
        self.inner.read().verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_appends_keep_single_chain() {
        let shared = SharedLedger::new();
        let writers = 8;
        let per_writer = 25;

        let handles: Vec<_> = (0..writers)
            .map(|writer| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for n in 0..per_writer {
                        let payload = Payload::new()
                            .with_integer("writer", writer)
                            .with_integer("seq", n);
                        shared.append_payment(payload).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.len(), 1 + (writers * per_writer) as usize);
        assert_eq!(shared.verify().unwrap(), shared.len());

        let snapshot = shared.snapshot();
        for (i, block) in snapshot.iter().enumerate().skip(1) {
            assert_eq!(block.prev_hash(), snapshot.blocks()[i - 1].hash());
        }
    }

    #[test]
    fn test_snapshot_is_detached() {
        let shared = SharedLedger::new();
        let before = shared.snapshot();
        shared
            .append_payment(Payload::new().with_text("note", "after"))
            .unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(shared.len(), 2);
        assert_eq!(shared.tip().prev_hash(), before.tip().hash());
    }
}
