use crate::rpc::RpcClient;
use alloy::consensus::Transaction as _;
use alloy::network::TransactionResponse;
use alloy::rpc::types::Transaction;
use alloy_primitives::B256;
use anyhow::Result;
use tracing::info;

/// Inclusive range of block heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWindow {
    pub start: u64,
    pub end: u64,
}

impl BlockWindow {
    /// Window covering the `depth` blocks up to and including `head`,
    /// saturating at genesis.
    pub fn trailing(head: u64, depth: u64) -> Self {
        BlockWindow {
            start: head.saturating_sub(depth),
            end: head,
        }
    }

    /// Number of blocks covered; never zero since both ends are inclusive.
    pub fn block_count(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// A contract-creation transaction found during a scan, keyed by its position
/// so downstream stages can report in chronological discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationTx {
    pub hash: B256,
    pub block_number: u64,
    pub tx_index: usize,
}

pub struct CreationScanner {
    client: RpcClient,
}

impl CreationScanner {
    pub fn new(client: RpcClient) -> Self {
        CreationScanner { client }
    }

    /// Walks every block in the window in ascending order and collects the
    /// transactions with no recipient. Any block fetch failure fails the
    /// whole scan; no partial results are returned.
    pub async fn scan(&self, window: BlockWindow) -> Result<Vec<CreationTx>> {
        info!(
            "Scanning {} blocks from {} to {}",
            window.block_count(),
            window.start,
            window.end
        );

        let mut creations = Vec::new();
        for block_number in window.start..=window.end {
            let block = self.client.get_block_with_txs(block_number).await?;
            creations.extend(creations_in_block(block_number, block.transactions.txns()));
        }

        info!("Found {} contract creations", creations.len());
        Ok(creations)
    }
}

/// Per-block selection step: keep only transactions with no recipient and
/// tag each with its position, so the overall (height, in-block index)
/// ordering is just scan order.
fn creations_in_block<'a>(
    block_number: u64,
    txs: impl Iterator<Item = &'a Transaction> + 'a,
) -> impl Iterator<Item = CreationTx> + 'a {
    txs.enumerate().filter_map(move |(tx_index, tx)| {
        tx.kind().is_create().then(|| CreationTx {
            hash: tx.tx_hash(),
            block_number,
            tx_index,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_is_inclusive_on_both_ends() {
        let window = BlockWindow::trailing(1000, 10);
        assert_eq!(window.start, 990);
        assert_eq!(window.end, 1000);
        assert_eq!(window.block_count(), 11);
    }

    #[test]
    fn trailing_window_saturates_at_genesis() {
        let window = BlockWindow::trailing(5, 100);
        assert_eq!(window.start, 0);
        assert_eq!(window.end, 5);
    }

    #[test]
    fn zero_depth_window_covers_exactly_one_block() {
        let window = BlockWindow::trailing(42, 0);
        assert_eq!(window.start, window.end);
        assert_eq!(window.block_count(), 1);
    }

    mod selection {
        use super::super::*;
        use alloy::consensus::transaction::Recovered;
        use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
        use alloy_primitives::{Address, Bytes, Signature, TxKind, U256};

        fn synthetic_tx(nonce: u64, to: TxKind) -> Transaction {
            let tx = TxLegacy {
                chain_id: Some(1),
                nonce,
                gas_price: 1,
                gas_limit: 21_000,
                to,
                value: U256::ZERO,
                input: Bytes::new(),
            };
            let signature = Signature::new(U256::from(1), U256::from(1), false);
            let envelope = TxEnvelope::Legacy(tx.into_signed(signature));
            Transaction {
                inner: Recovered::new_unchecked(envelope, Address::repeat_byte(0xde)),
                block_hash: None,
                block_number: None,
                transaction_index: None,
                effective_gas_price: None,
            }
        }

        fn call_tx(nonce: u64) -> Transaction {
            synthetic_tx(nonce, TxKind::Call(Address::repeat_byte(0x22)))
        }

        #[test]
        fn keeps_only_recipientless_transactions_with_their_index() {
            let txs = vec![
                synthetic_tx(0, TxKind::Create),
                call_tx(1),
                synthetic_tx(2, TxKind::Create),
            ];

            let found: Vec<CreationTx> = creations_in_block(7, txs.iter()).collect();

            assert_eq!(found.len(), 2);
            assert_eq!((found[0].block_number, found[0].tx_index), (7, 0));
            assert_eq!((found[1].block_number, found[1].tx_index), (7, 2));
            assert_eq!(found[0].hash, txs[0].tx_hash());
            assert_eq!(found[1].hash, txs[2].tx_hash());
        }

        #[test]
        fn block_without_creations_yields_nothing() {
            let txs = vec![call_tx(0), call_tx(1)];
            assert_eq!(creations_in_block(7, txs.iter()).count(), 0);
        }

        #[test]
        fn scan_order_is_height_then_in_block_index() {
            // Blocks as scan visits them, height ascending.
            let blocks = vec![
                (
                    10u64,
                    vec![synthetic_tx(0, TxKind::Create), synthetic_tx(1, TxKind::Create)],
                ),
                (11u64, vec![call_tx(2), synthetic_tx(3, TxKind::Create)]),
                (12u64, vec![synthetic_tx(4, TxKind::Create)]),
            ];

            let mut creations = Vec::new();
            for (height, txs) in &blocks {
                creations.extend(creations_in_block(*height, txs.iter()));
            }

            let keys: Vec<_> = creations
                .iter()
                .map(|c| (c.block_number, c.tx_index))
                .collect();
            assert_eq!(keys, vec![(10, 0), (10, 1), (11, 1), (12, 0)]);
        }
    }
}
